//! # wavemcp WebSocket Transport
//!
//! WebSocket implementation of the wavemcp transport channel, built on
//! `tokio-tungstenite`.
//!
//! ## Features
//!
//! - **Upgrade headers**: extra HTTP headers from [`TransportConfig::headers`]
//! - **Single reader task**: every text or binary frame becomes a
//!   [`TransportEvent::Message`]; close frames, errors and end of stream become the
//!   single terminal event
//! - **Keep-Alive**: optional periodic pings; incoming pings are answered with pongs
//! - **Size limits**: oversized outbound messages are rejected, oversized inbound
//!   frames are dropped with a warning
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wavemcp_transport_traits::{TransportConfig, TransportFactory};
//! use wavemcp_websocket::WebSocketTransportFactory;
//!
//! let factory = WebSocketTransportFactory::default();
//! let channel = factory
//!     .connect(&TransportConfig::websocket("ws://localhost:3000/mcp"))
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! wavemcp-websocket/
//! ├── config.rs      # WebSocket-specific options
//! ├── types.rs       # Stream aliases and the transport struct
//! ├── connection.rs  # Factory and connection establishment
//! ├── tasks.rs       # Reader and keep-alive tasks
//! └── transport.rs   # Transport trait implementation
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

pub mod config;
pub mod connection;
pub mod tasks;
pub mod transport;
pub mod types;

pub use config::WebSocketConfig;
pub use connection::WebSocketTransportFactory;
pub use types::WebSocketTransport;

// Re-export transport traits for convenience
pub use wavemcp_transport_traits::{
    LimitsConfig, Transport, TransportChannel, TransportConfig, TransportError, TransportEvent,
    TransportFactory, TransportMessage, TransportMetrics, TransportResult, TransportState,
    TransportType,
};
