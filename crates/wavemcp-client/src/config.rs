//! Session configuration.

use std::time::Duration;

use wavemcp_protocol::PROTOCOL_VERSION;
use wavemcp_protocol::types::{ClientCapabilities, Implementation};

/// Default time a request may stay unanswered
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the notification broadcast channel
pub const DEFAULT_NOTIFICATION_BUFFER: usize = 64;

/// Configuration for a [`Session`](crate::Session)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a request may stay unanswered before failing with `RequestTimeout`
    pub request_timeout: Duration,

    /// Identity announced in the `initialize` handshake
    pub client_info: Implementation,

    /// Protocol version requested in the handshake
    pub protocol_version: String,

    /// Capabilities announced in the handshake
    pub capabilities: ClientCapabilities,

    /// Capacity of the notification stream; slow subscribers lag past this
    pub notification_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client_info: Implementation::new("wavemcp", env!("CARGO_PKG_VERSION")),
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities::session_default(),
            notification_buffer: DEFAULT_NOTIFICATION_BUFFER,
        }
    }
}

impl SessionConfig {
    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the client identity sent during the handshake
    #[must_use]
    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_info = Implementation::new(name, version);
        self
    }

    /// Request a different protocol version
    #[must_use]
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Replace the announced client capabilities
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the notification stream capacity (minimum 1)
    #[must_use]
    pub fn with_notification_buffer(mut self, capacity: usize) -> Self {
        self.notification_buffer = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.client_info.name, "wavemcp");
        assert_eq!(config.protocol_version, "2024-11-05");
        assert!(config.capabilities.sampling.is_some());
    }

    #[test]
    fn test_builder_methods() {
        let config = SessionConfig::default()
            .with_request_timeout(Duration::from_millis(250))
            .with_client_info("inspector", "2.1.0")
            .with_notification_buffer(0);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.client_info.to_string(), "inspector 2.1.0");
        assert_eq!(config.notification_buffer, 1);
    }
}
