//! # wavemcp Client
//!
//! Session layer for talking to an MCP server over a message-oriented transport.
//!
//! A [`Session`] wraps one transport channel at a time and provides:
//!
//! - **Request correlation**: JSON-RPC requests are matched to their responses by id,
//!   concurrently and out of order, each bounded by a timeout
//! - **Lifecycle**: a small state machine ([`SessionState`]) covering connect,
//!   the `initialize` handshake, peer close, channel failure and disconnect
//! - **Capability cache**: the server's tools, resources and prompts, refreshed after
//!   the handshake and whenever the server reports a `list_changed` notification
//! - **Notifications**: every server notification is republished on a broadcast stream
//!
//! State is observable through plain getters and `tokio::sync::watch` receivers.
//!
//! ## Transports
//!
//! Sessions are transport-agnostic: they take any
//! [`TransportFactory`](wavemcp_transport_traits::TransportFactory). With the default
//! `websocket` feature, [`Session::websocket`] uses the WebSocket transport. The
//! in-process [`MemoryTransportFactory`] is always available.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use wavemcp_client::{Session, SessionConfig, TransportConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::websocket(
//!     SessionConfig::default().with_request_timeout(Duration::from_secs(10)),
//! );
//! session
//!     .connect(TransportConfig::websocket("ws://127.0.0.1:8080/mcp"))
//!     .await?;
//! session.initialize().await?;
//!
//! let result = session
//!     .call_tool("echo", Some(serde_json::json!({"text": "hi"})))
//!     .await?;
//! println!("{}", result.text());
//! # Ok(())
//! # }
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

mod cache;
pub mod config;
mod correlator;
mod diagnostics;
pub mod error;
mod router;
mod session;
pub mod state;

pub use cache::{ListKind, Snapshot};
pub use config::SessionConfig;
pub use diagnostics::SessionDiagnostics;
pub use error::{SessionError, SessionResult};
pub use session::Session;
pub use state::{ServerDetails, SessionState};

pub use wavemcp_protocol::{self as protocol, JsonRpcNotification};
pub use wavemcp_transport_traits::{
    MemoryListener, MemoryPeer, MemoryTransportFactory, TransportConfig, TransportError,
    TransportFactory, TransportMetrics,
};
#[cfg(feature = "websocket")]
pub use wavemcp_websocket::{WebSocketConfig, WebSocketTransportFactory};
