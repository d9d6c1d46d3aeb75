//! Session errors.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use wavemcp_protocol::JsonRpcError;
use wavemcp_transport_traits::TransportError;

use crate::state::SessionState;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by [`Session`](crate::Session) operations
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum SessionError {
    /// `connect` was called while a connection is open or being opened
    #[error("Session is already connected or connecting")]
    AlreadyConnected,

    /// The operation needs an open channel and there is none
    #[error("Not connected")]
    NotConnected,

    /// The session is not in a state that allows the operation
    #[error("Session is {state}, operation requires connected")]
    NotReady {
        /// State the session was in
        state: SessionState,
    },

    /// The transport channel could not be opened
    #[error("Failed to connect: {0}")]
    ConnectError(#[source] TransportError),

    /// No response arrived in time
    #[error("Request '{method}' timed out after {timeout:?}")]
    RequestTimeout {
        /// Method of the request that timed out
        method: String,
        /// Configured request timeout
        timeout: Duration,
    },

    /// The server answered with a JSON-RPC error
    #[error("MCP Error {code}: {message}")]
    Protocol {
        /// JSON-RPC error code
        code: i32,
        /// Error message from the server
        message: String,
        /// Optional structured detail
        data: Option<Value>,
    },

    /// A response arrived but its result did not have the expected shape
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The connection ended (or was replaced) before the operation completed
    #[error("Connection closed")]
    Disconnected,

    /// Sending over the open channel failed
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    /// An outbound message could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SessionError {
    /// JSON-RPC error code, for `Protocol` errors
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the error ended the operation because the connection went away
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, Self::Disconnected | Self::NotConnected)
    }
}

impl From<JsonRpcError> for SessionError {
    fn from(error: JsonRpcError) -> Self {
        Self::Protocol {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::NotConnected => Self::NotConnected,
            other => Self::Transport(other),
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
