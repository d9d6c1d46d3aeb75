//! WebSocket-specific configuration.

use std::time::Duration;

/// Options that only apply to WebSocket connections.
///
/// Endpoint, headers, connect timeout and size limits live in
/// [`wavemcp_transport_traits::TransportConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebSocketConfig {
    /// Interval between keep-alive pings. `None` disables them.
    pub keep_alive_interval: Option<Duration>,
}

impl WebSocketConfig {
    /// Enables keep-alive pings at the given interval.
    #[must_use]
    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = Some(interval);
        self
    }
}
