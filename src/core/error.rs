use thiserror::Error;

/// Error type for every fallible operation in the crate
///
/// Configuration variants are raised before any network call is made.
/// Everything else comes from a service call and is fatal to the run: the
/// orchestrator never retries and reports it to the result sink unmodified.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Input does not meet YAML 1.2 \"Core Schema\" specification: {name}")]
    InvalidBooleanInput { name: String },

    #[error("An instance ID must be provided.")]
    MissingTargetId,

    #[error("{operation} failed with HTTP {status} ({}): {message}", .code.as_deref().unwrap_or("UnknownError"))]
    Api {
        operation: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a missing input error
    pub fn missing_input<S: Into<String>>(name: S) -> Self {
        Self::MissingInput(name.into())
    }

    /// True for errors raised while reading inputs or building the runner,
    /// i.e. before any service was contacted
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::MissingInput(_)
                | Self::InvalidBooleanInput { .. }
                | Self::MissingTargetId
                | Self::InvalidEndpoint(_)
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingTargetId => format!(
                "{} Set the `instance-id` input or the {} environment variable.",
                self,
                crate::core::INSTANCE_ID_ENV
            ),
            Self::Api { status: 400, .. } | Self::Api { status: 403, .. } => format!(
                "{}. Check that the endpoint accepts the request and that the instance is managed by SSM.",
                self
            ),
            Self::Http(err) if err.is_connect() => {
                format!("{}. Check the service endpoint and your network connection.", self)
            }
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the crate
pub type Result<T> = std::result::Result<T, Error>;
