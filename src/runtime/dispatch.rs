use crate::core::{CommandSpec, Invocation, Result, ResultSink};
use crate::runtime::service::{response_dump, RemoteExecutionService, SubmitCommandRequest};
use tracing::debug;

/// Submits a command spec to the remote execution service
pub struct CommandDispatcher<'a> {
    service: &'a dyn RemoteExecutionService,
    end_marker: Option<&'a str>,
    mirror_output: bool,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(
        service: &'a dyn RemoteExecutionService,
        end_marker: Option<&'a str>,
        mirror_output: bool,
    ) -> Self {
        Self {
            service,
            end_marker,
            mirror_output,
        }
    }

    /// Command lines sent to the agent: the user's command, then the end marker
    pub fn command_lines(&self, spec: &CommandSpec) -> Vec<String> {
        let mut commands = vec![spec.text.clone()];
        if let Some(marker) = self.end_marker {
            commands.push(marker.to_string());
        }
        commands
    }

    /// Submit the command
    ///
    /// Returns `None` when the service answered without a command id. That
    /// submit is not retried and nothing is reported for it.
    pub async fn dispatch(
        &self,
        spec: &CommandSpec,
        sink: &dyn ResultSink,
    ) -> Result<Option<Invocation>> {
        let request = SubmitCommandRequest {
            target_id: spec.target_id.clone(),
            shell: spec.shell,
            commands: self.command_lines(spec),
            mirror_output: self.mirror_output,
        };
        let response = self.service.submit_command(&request).await?;
        sink.debug(&response_dump(
            "SendCommandOutput",
            response.raw.as_ref(),
            &response,
        ));

        let invocation = match response.invocation_id {
            Some(id) if response.http_success && !id.is_empty() => Some(Invocation {
                id,
                target_id: spec.target_id.clone(),
            }),
            _ => None,
        };
        debug!(
            document = spec.shell.document_name(),
            accepted = invocation.is_some(),
            "command submitted"
        );
        Ok(invocation)
    }
}
