//! Core types, configuration and error handling
//!
//! This module holds everything that does not talk to the network:
//! - The data model of a run (command spec, invocation, statuses, results)
//! - Runner configuration and its validation
//! - The crate error type
//! - The parameter source and result sink seams to the CI platform

pub mod binding;
pub mod config;
pub mod error;
pub mod types;


// Re-export commonly used types
pub use binding::{
    MemorySink, ParameterSource, ResultSink, SinkEvent, INPUT_COMMAND, INPUT_INSTANCE_ID,
    INPUT_POWERSHELL, INPUT_WAIT_FOR_AGENT, INSTANCE_ID_ENV, OUTPUT_EXIT_CODE,
};
pub use config::{RunnerConfig, DEFAULT_END_MARKER, DEFAULT_LOG_GROUP_PREFIX, DEFAULT_POLL_INTERVAL};
pub use error::{Error, Result};
pub use types::{
    CommandSpec, ExecutionResult, Invocation, InvocationDetails, InvocationStatus, RunOutcome,
    ShellKind, StreamContent, StreamKind, UNKNOWN_EXIT_CODE,
};
