use crate::core::{Result, ResultSink};
use crate::runtime::service::{response_dump, RemoteExecutionService};
use std::time::Duration;
use tracing::debug;

/// Blocks until the SSM agent on a target reports `Online`
///
/// There is no attempt limit. A target that never comes online keeps the
/// prober waiting until the surrounding job is killed.
pub struct AgentProber<'a> {
    service: &'a dyn RemoteExecutionService,
    interval: Duration,
}

impl<'a> AgentProber<'a> {
    pub fn new(service: &'a dyn RemoteExecutionService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Wait for the agent and return how many times the prober slept
    pub async fn wait_until_online(&self, target_id: &str, sink: &dyn ResultSink) -> Result<u32> {
        let mut waits = 0u32;

        loop {
            let status = self.service.describe_agent_status(target_id).await?;
            sink.debug(&response_dump(
                "DescribeInstanceInformationOutput",
                status.raw.as_ref(),
                &status,
            ));

            if status.online {
                debug!(target_id, waits, "agent online");
                return Ok(waits);
            }

            if waits == 0 {
                sink.info(&format!(
                    "Waiting for the SSM agent on {target_id} to come online..."
                ));
            } else {
                sink.info(&format!(
                    "Still waiting for the SSM agent on {target_id} (ping status: {})...",
                    status.ping_status.as_deref().unwrap_or("unknown")
                ));
            }

            tokio::time::sleep(self.interval).await;
            waits += 1;
        }
    }
}
