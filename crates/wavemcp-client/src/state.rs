//! Session lifecycle states and the server details recorded by the handshake.

use std::fmt;

use serde::Serialize;
use wavemcp_protocol::types::{Implementation, InitializeResult, ServerCapabilities};

/// Lifecycle state of a [`Session`](crate::Session)
///
/// ```text
/// Disconnected --connect--> Connecting --open--> Connected --initialize--> Initialized
///                               |                    |                          |
///                             fail               init fails /              channel error
///                               v                channel error                  |
///                             Error <---------------+---------------------------+
/// ```
///
/// `disconnect` leads to `Disconnected` from anywhere; `connect` is legal from
/// `Disconnected` and `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No channel
    #[default]
    Disconnected,
    /// Channel being opened
    Connecting,
    /// Channel open, handshake not done
    Connected,
    /// Handshake completed
    Initialized,
    /// Last connect, handshake or channel failed
    Error,
}

impl SessionState {
    /// Whether a channel is open (`Connected` or `Initialized`)
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Initialized)
    }

    /// Whether `connect` may be called in this state
    pub fn can_connect(self) -> bool {
        matches!(self, Self::Disconnected | Self::Error)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Initialized => "initialized",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// What the server told us about itself during the handshake
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetails {
    /// Server name and version
    pub server_info: Implementation,
    /// Capabilities the server declared
    pub capabilities: ServerCapabilities,
    /// Protocol version the server agreed to
    pub protocol_version: String,
    /// Usage instructions, if the server sent any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl From<InitializeResult> for ServerDetails {
    fn from(result: InitializeResult) -> Self {
        Self {
            server_info: result.server_info,
            capabilities: result.capabilities,
            protocol_version: result.protocol_version,
            instructions: result.instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_legality() {
        assert!(SessionState::Disconnected.can_connect());
        assert!(SessionState::Error.can_connect());
        assert!(!SessionState::Connecting.can_connect());
        assert!(!SessionState::Connected.can_connect());
        assert!(!SessionState::Initialized.can_connect());
    }

    #[test]
    fn test_is_connected() {
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::Initialized.is_connected());
        assert!(!SessionState::Connecting.is_connected());
        assert!(!SessionState::Error.is_connected());
    }

    #[test]
    fn test_serialized_name_matches_display() {
        let json = serde_json::to_value(SessionState::Initialized).unwrap();
        assert_eq!(json, serde_json::json!("initialized"));
        assert_eq!(SessionState::Initialized.to_string(), "initialized");
    }
}
