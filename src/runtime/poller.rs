use crate::core::{Invocation, InvocationDetails, Result, ResultSink};
use crate::runtime::service::{response_dump, RemoteExecutionService};
use std::time::Duration;
use tracing::debug;

/// Polls an invocation at a fixed cadence until it reaches a terminal status
///
/// Every poll, the first included, is preceded by a full interval. The loop
/// has no retry cap and no timeout of its own.
pub struct StatusPoller<'a> {
    service: &'a dyn RemoteExecutionService,
    interval: Duration,
}

impl<'a> StatusPoller<'a> {
    pub fn new(service: &'a dyn RemoteExecutionService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Poll until terminal and return that response as received
    pub async fn poll_until_terminal(
        &self,
        invocation: &Invocation,
        sink: &dyn ResultSink,
    ) -> Result<InvocationDetails> {
        let mut attempt = 0u64;

        loop {
            tokio::time::sleep(self.interval).await;
            attempt += 1;

            let details = self
                .service
                .get_invocation_status(&invocation.target_id, &invocation.id)
                .await?;
            sink.debug(&response_dump(
                "GetCommandInvocationOutput",
                details.raw.as_ref(),
                &details,
            ));
            debug!(invocation = %invocation.id, attempt, status = %details.status, "polled");

            if details.status.is_terminal() {
                return Ok(details);
            }

            sink.info("Still waiting...");
        }
    }
}
