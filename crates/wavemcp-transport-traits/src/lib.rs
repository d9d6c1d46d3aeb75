//! # wavemcp Transport Traits
//!
//! The contract between the wavemcp session layer and the byte pipes it talks over.
//!
//! ## Overview
//!
//! - **Traits**: [`Transport`] (an open connection) and [`TransportFactory`] (opens one)
//! - **Channel**: [`TransportChannel`] pairs a transport with the receiver of its
//!   [`TransportEvent`]s; every connection produces its own channel
//! - **Errors**: [`TransportError`], [`TransportResult`]
//! - **Config**: [`TransportConfig`], [`LimitsConfig`]
//! - **Metrics**: [`TransportMetrics`], [`AtomicMetrics`]
//! - **Memory**: [`MemoryTransportFactory`], an in-process transport whose server side
//!   ([`MemoryPeer`]) is driven by tests or by an embedding application
//!
//! ## Event contract
//!
//! A transport delivers zero or more [`TransportEvent::Message`] events followed by
//! exactly one terminal event, [`TransportEvent::Closed`] or [`TransportEvent::Error`].
//! [`TransportEventEmitter`] enforces this for implementations.
//!
//! ```rust,ignore
//! use wavemcp_transport_traits::{TransportConfig, TransportFactory, TransportEvent};
//!
//! let mut channel = factory.connect(&TransportConfig::websocket("ws://localhost:3000")).await?;
//! while let Some(event) = channel.events.recv().await {
//!     match event {
//!         TransportEvent::Message(bytes) => handle(bytes),
//!         TransportEvent::Closed { .. } | TransportEvent::Error { .. } => break,
//!     }
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
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

mod config;
mod error;
mod events;
mod memory;
mod message;
mod metrics;
mod traits;
mod types;

pub use config::LimitsConfig;
pub use error::{TransportError, TransportResult};
pub use events::{TransportEvent, TransportEventEmitter};
pub use memory::{MemoryListener, MemoryPeer, MemoryTransport, MemoryTransportFactory};
pub use message::TransportMessage;
pub use metrics::{AtomicMetrics, TransportMetrics};
pub use traits::{Transport, TransportChannel, TransportFactory};
pub use types::{TransportConfig, TransportState, TransportType};
