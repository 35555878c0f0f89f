use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sentinel appended after the user's command so the end of multi-line
/// output stays recognizable in streamed logs
pub const DEFAULT_END_MARKER: &str = "echo '==========END OF OUTPUT=========='";

/// Prefix of the CloudWatch log group SSM mirrors command output into
pub const DEFAULT_LOG_GROUP_PREFIX: &str = "/aws/ssm/";

/// Fixed wait between status polls and agent probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Runner settings
///
/// Defaults match the behaviour a CI step needs; tests and embedders can
/// override them through [`crate::runtime::OrchestratorBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Sleep before every status poll, including the first
    #[serde(default = "default_interval")]
    pub poll_interval: Duration,

    /// Sleep between agent readiness probes
    #[serde(default = "default_interval")]
    pub agent_poll_interval: Duration,

    /// Extra command line appended after the user's command
    #[serde(default = "default_end_marker")]
    pub end_marker: Option<String>,

    /// Ask SSM to mirror output to CloudWatch Logs and read it back from there
    #[serde(default = "default_true")]
    pub mirror_output: bool,

    #[serde(default = "default_log_group_prefix")]
    pub log_group_prefix: String,

    /// Emit ANSI colors around output blocks
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_interval(),
            agent_poll_interval: default_interval(),
            end_marker: default_end_marker(),
            mirror_output: default_true(),
            log_group_prefix: default_log_group_prefix(),
            color: default_true(),
        }
    }
}

impl RunnerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::configuration("poll interval must be greater than zero"));
        }
        if self.agent_poll_interval.is_zero() {
            return Err(Error::configuration(
                "agent poll interval must be greater than zero",
            ));
        }
        if let Some(marker) = &self.end_marker {
            if marker.trim().is_empty() {
                return Err(Error::configuration(
                    "end marker must not be blank; disable it instead",
                ));
            }
        }
        if !self.log_group_prefix.starts_with('/') {
            return Err(Error::configuration(format!(
                "log group prefix must start with '/': {}",
                self.log_group_prefix
            )));
        }
        Ok(())
    }
}

// Helper functions for default values
fn default_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_end_marker() -> Option<String> {
    Some(DEFAULT_END_MARKER.to_string())
}

fn default_log_group_prefix() -> String {
    DEFAULT_LOG_GROUP_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}
