//! Service contracts the runner depends on
//!
//! The orchestrator only sees these two traits. Production code plugs in the
//! HTTP clients from [`crate::runtime::aws`]; tests plug in in-memory fakes.

use crate::core::{InvocationDetails, Result, ShellKind};
use async_trait::async_trait;
use std::fmt;

/// Connectivity of the agent on a target host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub online: bool,
    /// Raw ping status as reported by the service, when there was one
    pub ping_status: Option<String>,
    /// Response body the status was read from
    pub raw: Option<serde_json::Value>,
}

impl AgentStatus {
    pub fn from_ping_status(ping_status: Option<String>) -> Self {
        Self {
            online: ping_status.as_deref() == Some("Online"),
            ping_status,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Request to run commands on one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCommandRequest {
    pub target_id: String,
    pub shell: ShellKind,
    pub commands: Vec<String>,
    pub mirror_output: bool,
}

/// Result of a submit call
///
/// `http_success` and a non-empty `invocation_id` together mean the command
/// was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCommandResponse {
    pub invocation_id: Option<String>,
    pub http_success: bool,
    pub raw: Option<serde_json::Value>,
}

/// Debug line for a service response
///
/// Prints the body as the service sent it under the service's output name.
/// Responses that never went over the wire are printed under their own
/// type name.
pub fn response_dump<T: fmt::Debug>(
    output_name: &str,
    raw: Option<&serde_json::Value>,
    mapped: &T,
) -> String {
    match raw {
        Some(raw) => format!("{output_name}: {raw}"),
        None => {
            let type_name = std::any::type_name::<T>();
            let short = type_name.rsplit("::").next().unwrap_or(type_name);
            format!("{short}: {mapped:?}")
        }
    }
}

/// Request for one page of a log stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPageRequest {
    pub log_group: String,
    pub log_stream: String,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogEvent {
    pub message: Option<String>,
}

/// One page of log events plus the token for the next page, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

/// Remote command execution service (SSM Run Command)
#[async_trait]
pub trait RemoteExecutionService: Send + Sync {
    async fn describe_agent_status(&self, target_id: &str) -> Result<AgentStatus>;

    async fn submit_command(&self, request: &SubmitCommandRequest)
        -> Result<SubmitCommandResponse>;

    async fn get_invocation_status(
        &self,
        target_id: &str,
        invocation_id: &str,
    ) -> Result<InvocationDetails>;
}

/// Log aggregation service (CloudWatch Logs)
#[async_trait]
pub trait LogService: Send + Sync {
    async fn get_log_page(&self, request: &LogPageRequest) -> Result<LogPage>;
}
