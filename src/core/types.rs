//! Data model for a single remote command run
//!
//! Every value here is transient and scoped to one run: a [`CommandSpec`] is
//! built from the CI inputs, an [`Invocation`] is issued by the service on
//! submit, [`InvocationDetails`] come back from each status poll, and a single
//! [`ExecutionResult`] ends the run.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit code reported when the service returns a terminal status without one
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Shell the remote agent uses to run the command
///
/// Each variant maps to one SSM document, which is the only thing that
/// differs between POSIX and Windows targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellKind {
    #[default]
    Shell,
    PowerShell,
}

impl ShellKind {
    /// Select the shell from the `powershell` boolean input
    pub fn from_powershell_flag(powershell: bool) -> Self {
        if powershell {
            Self::PowerShell
        } else {
            Self::Shell
        }
    }

    /// Name of the SSM document that runs commands in this shell
    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Shell => "AWS-RunShellScript",
            Self::PowerShell => "AWS-RunPowerShellScript",
        }
    }
}

/// What to run and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub text: String,
    pub shell: ShellKind,
    pub target_id: String,
    pub wait_for_agent: bool,
}

impl CommandSpec {
    /// Build a validated command spec
    ///
    /// Fails when the command text or the target id is empty, so a bad
    /// configuration never reaches the network.
    pub fn new(
        text: impl Into<String>,
        shell: ShellKind,
        target_id: impl Into<String>,
        wait_for_agent: bool,
    ) -> Result<Self> {
        let text = text.into();
        let target_id = target_id.into();

        if text.trim().is_empty() {
            return Err(Error::missing_input("command"));
        }
        if target_id.trim().is_empty() {
            return Err(Error::MissingTargetId);
        }

        Ok(Self {
            text,
            shell,
            target_id,
            wait_for_agent,
        })
    }
}

/// A submitted command on one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub id: String,
    pub target_id: String,
}

/// Status of a command invocation as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Pending,
    InProgress,
    Delayed,
    Cancelling,
    Success,
    Failed,
    Cancelled,
    TimedOut,
    #[serde(other)]
    Unknown,
}

impl InvocationStatus {
    /// Terminal statuses never change again and end the polling loop
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Cancelled | Self::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Delayed => "Delayed",
            Self::Cancelling => "Cancelling",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::TimedOut => "TimedOut",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two captured output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Suffix used in the CloudWatch log stream name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of one output stream, resolved once per stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamContent {
    Inline(String),
    #[default]
    Empty,
}

impl StreamContent {
    /// Map an optional response field; absent and empty strings are both `Empty`
    pub fn from_field(field: Option<String>) -> Self {
        match field {
            Some(text) if !text.is_empty() => Self::Inline(text),
            _ => Self::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Inline(text) => Some(text),
            Self::Empty => None,
        }
    }
}

/// Snapshot of an invocation returned by a status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationDetails {
    pub invocation_id: String,
    pub target_id: String,
    pub status: InvocationStatus,
    pub response_code: Option<i32>,
    pub stdout: StreamContent,
    pub stderr: StreamContent,
    pub document_name: String,
    pub plugin_name: Option<String>,
    /// Response body the details were read from
    pub raw: Option<serde_json::Value>,
}

impl InvocationDetails {
    /// Inline content for the given stream
    pub fn content(&self, stream: StreamKind) -> &StreamContent {
        match stream {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }
}

/// Final result of a completed invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub status: InvocationStatus,
}

impl ExecutionResult {
    pub fn from_details(details: &InvocationDetails) -> Self {
        Self {
            exit_code: details.response_code.unwrap_or(UNKNOWN_EXIT_CODE),
            status: details.status,
        }
    }
}

/// How a run ended
///
/// `NotDispatched` means the service accepted the submit but returned no
/// command id. No exit code exists in that case, which callers must keep
/// distinct from an exit code of `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NotDispatched,
    Completed(ExecutionResult),
}

impl RunOutcome {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NotDispatched => None,
            Self::Completed(result) => Some(result.exit_code),
        }
    }
}
