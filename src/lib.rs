//! # ssm-command
//!
//! Runs a shell or PowerShell command on an EC2 instance through AWS Systems
//! Manager Run Command, waits for it to finish, prints its output and reports
//! the exit code back to the CI job.
//!
//! ## Layout
//!
//! - [`core`]: data model, configuration, errors and the CI binding traits
//! - [`runtime`]: service clients, the agent prober, dispatcher, status
//!   poller, log paginator and the [`runtime::Orchestrator`] tying them together
//! - [`output`]: framing and coloring of captured stdout/stderr
//! - `cli` (feature `cli`): GitHub Actions inputs/outputs and the binary's
//!   argument parsing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ssm_command::core::{CommandSpec, MemorySink, ShellKind};
//! use ssm_command::runtime::{CloudWatchLogsClient, Orchestrator, SsmClient};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> ssm_command::core::Result<()> {
//! let orchestrator = Orchestrator::builder()
//!     .remote(Arc::new(SsmClient::for_region("us-east-1")?))
//!     .logs(Arc::new(CloudWatchLogsClient::for_region("us-east-1")?))
//!     .build()?;
//!
//! let spec = CommandSpec::new("df -h", ShellKind::Shell, "i-0123456789abcdef0", true)?;
//! let sink = MemorySink::new();
//! let outcome = orchestrator.execute(&spec, &sink).await?;
//!
//! for line in sink.info_lines() {
//!     println!("{line}");
//! }
//! println!("exit code: {:?}", outcome.exit_code());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod output;
pub mod runtime;

#[cfg(test)]
mod testing;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
