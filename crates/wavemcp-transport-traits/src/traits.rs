//! The `Transport` and `TransportFactory` seams.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportResult;
use crate::events::TransportEvent;
use crate::message::TransportMessage;
use crate::metrics::TransportMetrics;
use crate::types::{TransportConfig, TransportState, TransportType};

/// An open, message-oriented connection.
///
/// Inbound traffic is not pulled through this trait; it arrives on the
/// [`TransportChannel::events`] receiver handed out at connect time.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Kind of connection
    fn transport_type(&self) -> TransportType;

    /// Current lifecycle state
    fn state(&self) -> TransportState;

    /// Write one frame. Fails with `NotConnected` after close or failure.
    async fn send(&self, message: TransportMessage) -> TransportResult<()>;

    /// Close the connection; later calls do nothing.
    async fn close(&self) -> TransportResult<()>;

    /// Counter snapshot
    fn metrics(&self) -> TransportMetrics;

    /// Whether `send` can still succeed
    fn is_open(&self) -> bool {
        matches!(self.state(), TransportState::Connected)
    }

    /// Peer address, when the transport has one
    fn endpoint(&self) -> Option<String> {
        None
    }
}

/// A freshly opened connection: the transport handle and its event stream.
#[derive(Debug)]
pub struct TransportChannel {
    /// Handle used to send and close.
    pub transport: Arc<dyn Transport>,
    /// Inbound messages followed by exactly one terminal event.
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens connections of one transport type.
#[async_trait]
pub trait TransportFactory: Send + Sync + fmt::Debug {
    /// Kind of connection this factory opens
    fn transport_type(&self) -> TransportType;

    /// Open a connection; resolves once frames can flow.
    async fn connect(&self, config: &TransportConfig) -> TransportResult<TransportChannel>;
}
