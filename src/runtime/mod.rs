//! Remote command execution runtime
//!
//! This module handles:
//! - Talking to SSM and CloudWatch Logs over HTTP
//! - Waiting for the target's agent to come online
//! - Submitting the command and polling it to completion
//! - Reading mirrored output back from the log store
//! - Sequencing all of the above in the [`Orchestrator`]

pub mod agent;
pub mod aws;
pub mod dispatch;
pub mod logs;
pub mod orchestrator;
pub mod poller;
pub mod service;


// Re-export key types for convenience
pub use agent::AgentProber;
pub use aws::{regional_endpoint, CloudWatchLogsClient, SsmClient};
pub use dispatch::CommandDispatcher;
pub use logs::{LogLocator, LogPaginator};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, RunState};
pub use poller::StatusPoller;
pub use service::{
    response_dump, AgentStatus, LogEvent, LogPage, LogPageRequest, LogService,
    RemoteExecutionService,
    SubmitCommandRequest, SubmitCommandResponse,
};
