//! CLI failures and the hints printed with them

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use wavemcp_client::SessionError;

/// Everything a command can fail with
#[derive(Error, Debug)]
pub enum CliError {
    /// Bad flag value or `--arguments` payload
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON-RPC error returned by the server
    #[error("Server rejected the request ({code}): {message}")]
    ServerError { code: i32, message: String },

    /// No response within the request timeout
    #[error("'{operation}' got no response within {elapsed:?}")]
    Timeout {
        operation: String,
        elapsed: Duration,
    },

    /// Could not reach the server, or lost it
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// `tools/call` answered with `isError: true`
    #[error("Tool '{0}' reported an error")]
    ToolFailed(String),

    /// Session failure with no more specific mapping
    #[error(transparent)]
    Session(SessionError),

    /// Output could not be encoded
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file or `WAVEMCP_*` variables could not be read
    #[error("Bad settings: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Hints shown under the error message
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::ConnectionFailed(_) => &[
                "Make sure the server is up and listening",
                "Check the URL scheme (ws:// or wss://) and path",
                "Pass required headers with --header NAME=VALUE",
            ],
            Self::Timeout { .. } => &[
                "Raise the limit with --timeout SECONDS",
                "The server may be stuck on this request",
            ],
            Self::InvalidArguments(_) => &[
                "--arguments takes a JSON object, e.g. '{\"a\": 1}'",
                "Run with --help for the accepted flags",
            ],
            Self::Session(SessionError::Disconnected) => {
                &["The server closed the connection; check its logs"]
            }
            Self::Config(_) => &[
                "Check the config file syntax",
                "Unset WAVEMCP_* variables that hold invalid values",
            ],
            _ => &[],
        }
    }

    /// Bucket used to label the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionFailed(_) => ErrorCategory::Connection,
            Self::Session(err) if err.is_connection_loss() => ErrorCategory::Connection,
            Self::InvalidArguments(_) => ErrorCategory::Usage,
            Self::ServerError { .. } | Self::ToolFailed(_) => ErrorCategory::Server,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Json(_) => ErrorCategory::Output,
            Self::Config(_) => ErrorCategory::Settings,
            Self::Session(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }
}

/// Label printed in front of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Usage,
    Server,
    Timeout,
    Output,
    Settings,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Usage => "usage",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Output => "output",
            Self::Settings => "settings",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ConnectError(source) => Self::ConnectionFailed(source.to_string()),
            SessionError::RequestTimeout { method, timeout } => Self::Timeout {
                operation: method,
                elapsed: timeout,
            },
            SessionError::Protocol { code, message, .. } => Self::ServerError { code, message },
            other => Self::Session(other),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
