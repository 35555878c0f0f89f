//! Command-line entry point for running the step in CI
//!
//! ## Usage
//!
//! ```bash
//! # Inputs come from the environment, as the GitHub Actions runner sets them
//! INPUT_COMMAND='systemctl status app' INPUT_INSTANCE-ID=i-0123456789abcdef0 ssm-command
//!
//! # Talk to a local emulator instead of AWS
//! ssm-command --ssm-endpoint http://localhost:4566 --logs-endpoint http://localhost:4566
//! ```

pub mod app;
pub mod inputs;
pub mod sink;

// Re-export commonly used types
pub use app::Cli;
pub use inputs::ActionInputs;
pub use sink::GithubActionsSink;
