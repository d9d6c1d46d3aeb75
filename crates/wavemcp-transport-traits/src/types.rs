//! Transport kinds, lifecycle state and connection settings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;

/// Which factory a [`TransportConfig`] is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// `ws://` or `wss://` endpoint
    WebSocket,
    /// In-process pipe
    Memory,
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket => write!(f, "websocket"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Lifecycle of one opened transport. It starts `Connected` and never goes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// Open; `send` is accepted
    Connected,
    /// Closed by either side
    Disconnected,
    /// Broken by an I/O or protocol failure
    Failed {
        /// What broke
        reason: String,
    },
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Where and how to open a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Factory this configuration targets
    pub transport_type: TransportType,

    /// Endpoint; required for WebSocket
    pub url: Option<String>,

    /// Headers added to the upgrade request
    pub headers: HashMap<String, String>,

    /// Bound on opening the connection
    pub connect_timeout: Duration,

    /// Frame size caps
    pub limits: LimitsConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::WebSocket,
            url: None,
            headers: HashMap::new(),
            connect_timeout: Duration::from_secs(30),
            limits: LimitsConfig::default(),
        }
    }
}

impl TransportConfig {
    /// Settings for a WebSocket endpoint.
    pub fn websocket(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Settings for the in-process transport.
    pub fn memory() -> Self {
        Self {
            transport_type: TransportType::Memory,
            ..Self::default()
        }
    }

    /// Add or replace an upgrade header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the 30 second connect bound.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Replace the frame size caps.
    #[must_use]
    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self
    }
}
