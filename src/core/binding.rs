//! Seams between the runner and the CI platform
//!
//! [`ParameterSource`] supplies the named inputs of the step and
//! [`ResultSink`] receives everything the step reports back: the `exit-code`
//! output, operator-facing log lines and the job failure signal.

use crate::core::error::{Error, Result};
use crate::core::types::{CommandSpec, ShellKind};
use parking_lot::Mutex;

/// Environment variable consulted when the `instance-id` input is absent
pub const INSTANCE_ID_ENV: &str = "SSM_COMMAND_INSTANCE_ID";

pub const INPUT_COMMAND: &str = "command";
pub const INPUT_INSTANCE_ID: &str = "instance-id";
pub const INPUT_POWERSHELL: &str = "powershell";
pub const INPUT_WAIT_FOR_AGENT: &str = "wait-for-agent";

/// Name of the single output the step sets
pub const OUTPUT_EXIT_CODE: &str = "exit-code";

/// Read access to the step's named inputs
pub trait ParameterSource {
    /// Value of an input, `None` when unset or blank
    fn input(&self, name: &str) -> Option<String>;

    /// Boolean input; absent means `false`
    ///
    /// Accepts the YAML 1.2 core schema spellings only, anything else is a
    /// configuration error.
    fn boolean_input(&self, name: &str) -> Result<bool> {
        match self.input(name).as_deref() {
            None => Ok(false),
            Some("true" | "True" | "TRUE") => Ok(true),
            Some("false" | "False" | "FALSE") => Ok(false),
            Some(_) => Err(Error::InvalidBooleanInput {
                name: name.to_string(),
            }),
        }
    }
}

/// Destination for everything the run reports
pub trait ResultSink: Send + Sync {
    fn set_output(&self, name: &str, value: &str) -> Result<()>;

    fn set_failed(&self, error: &Error);

    fn info(&self, line: &str);

    fn debug(&self, line: &str);
}

impl CommandSpec {
    /// Build the command spec from step inputs
    ///
    /// `fallback_target` is used when the `instance-id` input is absent,
    /// normally the value of [`INSTANCE_ID_ENV`].
    pub fn from_parameters(
        params: &dyn ParameterSource,
        fallback_target: Option<String>,
    ) -> Result<Self> {
        let text = params
            .input(INPUT_COMMAND)
            .ok_or_else(|| Error::missing_input(INPUT_COMMAND))?;
        let target_id = params
            .input(INPUT_INSTANCE_ID)
            .or(fallback_target)
            .ok_or(Error::MissingTargetId)?;
        let shell = ShellKind::from_powershell_flag(params.boolean_input(INPUT_POWERSHELL)?);
        let wait_for_agent = params.boolean_input(INPUT_WAIT_FOR_AGENT)?;

        Self::new(text, shell, target_id, wait_for_agent)
    }
}

/// Something a [`MemorySink`] recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Output { name: String, value: String },
    Failed(String),
    Info(String),
    Debug(String),
}

/// Sink that keeps every event in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Value of a named output, if it was set
    pub fn output(&self, name: &str) -> Option<String> {
        self.events.lock().iter().rev().find_map(|event| match event {
            SinkEvent::Output { name: n, value } if n == name => Some(value.clone()),
            _ => None,
        })
    }

    pub fn failure(&self) -> Option<String> {
        self.events.lock().iter().find_map(|event| match event {
            SinkEvent::Failed(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn info_lines(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Info(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ResultSink for MemorySink {
    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        self.events.lock().push(SinkEvent::Output {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_failed(&self, error: &Error) {
        self.events.lock().push(SinkEvent::Failed(error.to_string()));
    }

    fn info(&self, line: &str) {
        self.events.lock().push(SinkEvent::Info(line.to_string()));
    }

    fn debug(&self, line: &str) {
        self.events.lock().push(SinkEvent::Debug(line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl ParameterSource for MapSource {
        fn input(&self, name: &str) -> Option<String> {
            self.0
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
    }

    fn source(pairs: &[(&'static str, &'static str)]) -> MapSource {
        MapSource(pairs.iter().copied().collect())
    }

    #[test]
    fn test_explicit_instance_id_wins() {
        let params = source(&[("command", "uptime"), ("instance-id", "i-explicit")]);
        let spec =
            CommandSpec::from_parameters(&params, Some("i-from-env".to_string())).unwrap();
        assert_eq!(spec.target_id, "i-explicit");
        assert_eq!(spec.shell, ShellKind::Shell);
        assert!(!spec.wait_for_agent);
    }

    #[test]
    fn test_instance_id_falls_back_to_environment() {
        let params = source(&[("command", "uptime")]);
        let spec =
            CommandSpec::from_parameters(&params, Some("i-from-env".to_string())).unwrap();
        assert_eq!(spec.target_id, "i-from-env");
    }

    #[test]
    fn test_missing_instance_id_is_configuration_error() {
        let params = source(&[("command", "uptime"), ("instance-id", "  ")]);
        let err = CommandSpec::from_parameters(&params, None).unwrap_err();
        assert!(matches!(err, Error::MissingTargetId));
        assert!(err.is_configuration());

        // An empty fallback is no better than none
        let err = CommandSpec::from_parameters(&params, Some(String::new())).unwrap_err();
        assert!(matches!(err, Error::MissingTargetId));
    }

    #[test]
    fn test_missing_command_is_reported_first() {
        let params = source(&[("instance-id", "i-1")]);
        let err = CommandSpec::from_parameters(&params, None).unwrap_err();
        assert_eq!(err.to_string(), "Input required and not supplied: command");
    }

    #[test]
    fn test_boolean_inputs() {
        let params = source(&[
            ("command", "Get-Date"),
            ("instance-id", "i-1"),
            ("powershell", "True"),
            ("wait-for-agent", "TRUE"),
        ]);
        let spec = CommandSpec::from_parameters(&params, None).unwrap();
        assert_eq!(spec.shell, ShellKind::PowerShell);
        assert!(spec.wait_for_agent);

        let params = source(&[("command", "x"), ("instance-id", "i-1"), ("powershell", "yes")]);
        let err = CommandSpec::from_parameters(&params, None).unwrap_err();
        assert!(matches!(err, Error::InvalidBooleanInput { ref name } if name == "powershell"));
    }

    #[test]
    fn test_memory_sink_records_events() {
        let sink = MemorySink::new();
        sink.info("hello");
        sink.debug("raw");
        sink.set_output("exit-code", "0").unwrap();
        sink.set_failed(&Error::MissingTargetId);

        assert_eq!(sink.info_lines(), vec!["hello".to_string()]);
        assert_eq!(sink.output("exit-code").as_deref(), Some("0"));
        assert_eq!(
            sink.failure().as_deref(),
            Some("An instance ID must be provided.")
        );
        assert_eq!(sink.events().len(), 4);
    }
}
