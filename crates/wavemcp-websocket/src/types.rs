//! Core types and type aliases for the WebSocket transport.

use std::sync::Arc;

use futures::stream::{SplitSink, SplitStream};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use wavemcp_transport_traits::{
    AtomicMetrics, LimitsConfig, TransportEventEmitter, TransportState,
};

/// Client WebSocket stream
pub type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket writer handle for sending messages (shared by `send`, `close` and pong replies)
pub type WebSocketWriter = Arc<tokio::sync::Mutex<Option<SplitSink<ClientStream, Message>>>>;

/// WebSocket read half, owned by the reader task
pub type WebSocketReader = SplitStream<ClientStream>;

/// One open WebSocket connection.
#[derive(Debug)]
pub struct WebSocketTransport {
    /// Identifier used in log messages
    pub(crate) session_id: String,

    /// Endpoint URL
    pub(crate) url: String,

    /// Transport state, shared with the reader task
    pub(crate) state: Arc<Mutex<TransportState>>,

    /// WebSocket write half
    pub(crate) writer: WebSocketWriter,

    /// Publishes inbound messages and the terminal event
    pub(crate) emitter: TransportEventEmitter,

    /// Stops the background tasks
    pub(crate) shutdown_tx: broadcast::Sender<()>,

    /// Counters
    pub(crate) metrics: Arc<AtomicMetrics>,

    /// Outbound/inbound size limits
    pub(crate) limits: LimitsConfig,

    /// Reader and keep-alive task handles
    pub(crate) task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WebSocketTransport {
    /// Identifier of this connection in log messages
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        // Tasks hold clones of the writer; stop them so the socket is released.
        let _ = self.shutdown_tx.send(());
    }
}
