//! # wavemcp Protocol
//!
//! JSON-RPC 2.0 envelopes and the subset of Model Context Protocol types that the
//! wavemcp session layer exchanges with a server.
//!
//! ## What's Inside
//!
//! - **JSON-RPC**: [`jsonrpc`] request, response, notification and error objects
//! - **Inbound classification**: [`InboundMessage`] splits every payload received from a
//!   server into exactly one of *response* or *notification*
//! - **Types**: tools, resources, prompts, content blocks and the `initialize` handshake
//! - **Methods**: well-known method and notification names in [`methods`]
//!
//! ## Example
//!
//! ```rust
//! use wavemcp_protocol::{InboundMessage, RequestId};
//!
//! let msg = InboundMessage::parse(br#"{"jsonrpc":"2.0","id":0,"result":{}}"#).unwrap();
//! match msg {
//!     InboundMessage::Response(response) => {
//!         assert_eq!(response.request_id(), Some(&RequestId::Number(0)));
//!     }
//!     InboundMessage::Notification(_) => unreachable!(),
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod inbound;
pub mod jsonrpc;
pub mod methods;
pub mod types;

pub use inbound::{InboundMessage, ParseError};
pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    JsonRpcVersion, RequestId, codes,
};

/// Protocol revision announced in the `initialize` handshake unless configured otherwise.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Upper bound for a single serialized message (16 MiB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
