//! Transport failures.

use std::time::Duration;
use thiserror::Error;

/// Result alias used by every transport operation.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Why a transport operation failed.
///
/// Values are cloneable so the same failure can be both returned to a caller
/// and published as a [`TransportEvent::Error`](crate::TransportEvent::Error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The connection could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The connection broke after it was open.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The channel is closed or was never opened.
    #[error("Transport is not connected")]
    NotConnected,

    /// A frame could not be written.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// A payload could not be encoded for the wire.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Opening the connection took longer than `connect_timeout`.
    #[error("Connection timed out after {timeout:?}")]
    ConnectionTimeout {
        /// The limit that was hit
        timeout: Duration,
    },

    /// The transport configuration cannot be used.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Outgoing frame is over `max_outbound`.
    #[error("Outgoing frame of {size} bytes exceeds the {max} byte limit")]
    OutboundTooLarge {
        /// Frame size in bytes
        size: usize,
        /// Configured cap
        max: usize,
    },

    /// Incoming frame is over `max_inbound`.
    #[error("Incoming frame of {size} bytes exceeds the {max} byte limit")]
    InboundTooLarge {
        /// Frame size in bytes
        size: usize,
        /// Configured cap
        max: usize,
    },
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_limit() {
        let err = TransportError::OutboundTooLarge { size: 9, max: 8 };
        assert_eq!(
            err.to_string(),
            "Outgoing frame of 9 bytes exceeds the 8 byte limit"
        );
        let err = TransportError::ConnectionTimeout {
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "Connection timed out after 2s");
    }

    #[test]
    fn json_errors_become_serialization_failures() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            TransportError::from(json_err),
            TransportError::SerializationFailed(_)
        ));
    }
}
