use crate::core::ParameterSource;
use std::collections::HashMap;
use tracing::warn;

const INPUT_PREFIX: &str = "INPUT_";

/// Step inputs as GitHub Actions passes them: `INPUT_<NAME>` environment variables
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    vars: HashMap<String, String>,
}

impl ActionInputs {
    /// Snapshot the inputs from the process environment
    ///
    /// Only `INPUT_*` variables are read. Any other variable may hold bytes
    /// that are not UTF-8; an input that is not UTF-8 is skipped and reads
    /// as absent.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            if !key.starts_with(INPUT_PREFIX) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    warn!(variable = %key, "ignoring input that is not valid UTF-8");
                    None
                }
            }
        }))
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(k, _)| k.starts_with(INPUT_PREFIX))
                .collect(),
        }
    }

    /// Environment variable name for an input, e.g. `instance-id` -> `INPUT_INSTANCE-ID`
    pub fn variable_name(name: &str) -> String {
        format!("{INPUT_PREFIX}{}", name.replace(' ', "_").to_uppercase())
    }
}

impl ParameterSource for ActionInputs {
    fn input(&self, name: &str) -> Option<String> {
        self.vars
            .get(&Self::variable_name(name))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
