//! Error types for the Slack client.
//!
//! The client performs no local recovery: failures from the transport and
//! from the JSON decoder reach the caller unchanged, each under its own
//! variant of [`SlackError`].

use thiserror::Error;

/// Result type for Slack operations
pub type SlackResult<T> = Result<T, SlackError>;

/// Root error type for the Slack client
#[derive(Error, Debug, Clone)]
pub enum SlackError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Failure raised by the HTTP transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body was not valid JSON
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SlackError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SLACK_CONFIG",
            Self::Transport(TransportError::Timeout) => "SLACK_TIMEOUT",
            Self::Transport(TransportError::Status { .. }) => "SLACK_HTTP_STATUS",
            Self::Transport(_) => "SLACK_TRANSPORT",
            Self::Parse(_) => "SLACK_PARSE",
        }
    }

    /// Get the HTTP status code if the server answered with one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Whether this error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this error came from decoding the response body
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// CA bundle could not be loaded
    #[error("Invalid CA bundle at {path}: {message}")]
    InvalidCaBundle {
        /// Path of the bundle
        path: String,
        /// Error message
        message: String,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(String),
}

/// Transport errors
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// TLS error
    #[error("TLS error: {message}")]
    TlsError {
        /// Error message
        message: String,
    },

    /// Server answered with a non-success status
    #[error("HTTP status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::ConnectionFailed {
                message: err.to_string(),
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Response parsing errors
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    /// Body is not valid JSON, or does not match the requested type
    #[error("Invalid JSON: {message}")]
    InvalidJson {
        /// Error message
        message: String,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::InvalidJson {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(err: serde_json::Error) -> Self {
        SlackError::Parse(err.into())
    }
}
