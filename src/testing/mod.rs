//! Test support shared across modules
//!
//! - Scripted fakes of the remote execution and log services
//! - Invocation detail builders

pub mod mocks;
