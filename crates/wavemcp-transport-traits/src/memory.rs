//! In-process transport.
//!
//! [`MemoryTransportFactory::new`] returns the client-side factory together with a
//! [`MemoryListener`]. Every successful `connect` hands the listener a [`MemoryPeer`],
//! the server end of the connection, which can read what the client sent and push
//! frames, closes and failures back to it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::config::LimitsConfig;
use crate::error::{TransportError, TransportResult};
use crate::events::TransportEventEmitter;
use crate::message::TransportMessage;
use crate::metrics::{AtomicMetrics, TransportMetrics};
use crate::traits::{Transport, TransportChannel, TransportFactory};
use crate::types::{TransportConfig, TransportState, TransportType};

#[derive(Debug, Default)]
struct ListenerControl {
    refuse: AtomicBool,
    connect_delay_ms: AtomicU64,
    connections: AtomicU64,
}

/// Client side of the in-process transport.
#[derive(Debug, Clone)]
pub struct MemoryTransportFactory {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    control: Arc<ListenerControl>,
}

/// Server side of the in-process transport; yields one [`MemoryPeer`] per connection.
#[derive(Debug)]
pub struct MemoryListener {
    accept_rx: mpsc::UnboundedReceiver<MemoryPeer>,
    control: Arc<ListenerControl>,
}

impl MemoryTransportFactory {
    /// Creates a connected factory/listener pair.
    pub fn new() -> (Self, MemoryListener) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let control = Arc::new(ListenerControl::default());
        (
            Self {
                accept_tx,
                control: Arc::clone(&control),
            },
            MemoryListener { accept_rx, control },
        )
    }
}

impl MemoryListener {
    /// Waits for the next client connection.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accept_rx.recv().await
    }

    /// Makes subsequent connects fail with `ConnectionFailed` while `refuse` is set.
    pub fn refuse_connections(&self, refuse: bool) {
        self.control.refuse.store(refuse, Ordering::Release);
    }

    /// Delays subsequent connects, simulating a slow handshake.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.control
            .connect_delay_ms
            .store(delay.as_millis() as u64, Ordering::Release);
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> u64 {
        self.control.connections.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TransportFactory for MemoryTransportFactory {
    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    async fn connect(&self, config: &TransportConfig) -> TransportResult<TransportChannel> {
        let delay = self.control.connect_delay_ms.load(Ordering::Acquire);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.control.refuse.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (emitter, events) = TransportEventEmitter::new();
        let state = Arc::new(Mutex::new(TransportState::Connected));
        let connection = self.control.connections.fetch_add(1, Ordering::AcqRel) + 1;

        let peer = MemoryPeer {
            inbound: outbound_rx,
            emitter: emitter.clone(),
            state: Arc::clone(&state),
            connection,
        };
        self.accept_tx
            .send(peer)
            .map_err(|_| TransportError::ConnectionFailed("listener dropped".to_string()))?;

        debug!("Memory transport connection {} established", connection);

        let transport = MemoryTransport {
            outbound: Mutex::new(Some(outbound_tx)),
            emitter,
            state,
            limits: config.limits,
            metrics: AtomicMetrics::new(),
            connection,
        };

        Ok(TransportChannel {
            transport: Arc::new(transport),
            events,
        })
    }
}

/// Client end of one in-process connection.
#[derive(Debug)]
pub struct MemoryTransport {
    outbound: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    emitter: TransportEventEmitter,
    state: Arc<Mutex<TransportState>>,
    limits: LimitsConfig,
    metrics: AtomicMetrics,
    connection: u64,
}

#[async_trait]
impl Transport for MemoryTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    fn state(&self) -> TransportState {
        self.state.lock().clone()
    }

    async fn send(&self, message: TransportMessage) -> TransportResult<()> {
        if !self.is_open() {
            return Err(TransportError::NotConnected);
        }
        self.limits.check_outbound(message.size())?;

        let start = Instant::now();
        let size = message.size();
        let sender = self.outbound.lock().clone();
        let sender = sender.ok_or(TransportError::NotConnected)?;
        sender
            .send(message.payload)
            .map_err(|_| TransportError::SendFailed("peer dropped".to_string()))?;

        self.metrics.record_sent(size, start.elapsed());
        trace!(
            "Memory connection {} sent {} bytes (id {:?})",
            self.connection, size, message.id
        );
        Ok(())
    }

    async fn close(&self) -> TransportResult<()> {
        let sender = self.outbound.lock().take();
        if sender.is_none() {
            return Ok(());
        }
        {
            let mut state = self.state.lock();
            if matches!(*state, TransportState::Connected) {
                *state = TransportState::Disconnected;
            }
        }
        self.emitter
            .emit_closed(Some("closed by client".to_string()));
        debug!("Memory transport connection {} closed", self.connection);
        Ok(())
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.snapshot()
    }

    fn endpoint(&self) -> Option<String> {
        Some(format!("memory://{}", self.connection))
    }
}

/// Server end of one in-process connection.
#[derive(Debug)]
pub struct MemoryPeer {
    inbound: mpsc::UnboundedReceiver<Bytes>,
    emitter: TransportEventEmitter,
    state: Arc<Mutex<TransportState>>,
    connection: u64,
}

impl MemoryPeer {
    /// Sequence number of this connection on its listener, starting at 1.
    pub fn connection(&self) -> u64 {
        self.connection
    }

    /// Next payload sent by the client, or `None` once the client closed.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.inbound.recv().await
    }

    /// Next payload sent by the client, parsed as JSON. Non-JSON payloads yield `Value::Null`.
    pub async fn recv_json(&mut self) -> Option<Value> {
        let bytes = self.recv().await?;
        Some(serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Delivers a raw frame to the client. Returns `false` if the connection is over.
    pub fn send_raw(&self, payload: impl Into<Bytes>) -> bool {
        self.emitter.emit_message(payload.into())
    }

    /// Delivers a JSON value to the client. Returns `false` if the connection is over.
    pub fn send_json(&self, value: &Value) -> bool {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.send_raw(bytes),
            Err(_) => false,
        }
    }

    /// Closes the connection from the server side.
    pub fn close(&self, reason: Option<&str>) {
        *self.state.lock() = TransportState::Disconnected;
        self.emitter.emit_closed(reason.map(str::to_string));
    }

    /// Fails the connection from the server side.
    pub fn fail(&self, message: &str) {
        *self.state.lock() = TransportState::Failed {
            reason: message.to_string(),
        };
        self.emitter
            .emit_error(TransportError::ConnectionLost(message.to_string()));
    }

    /// Whether the client side still considers the connection open.
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), TransportState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TransportEvent;

    #[tokio::test]
    async fn test_round_trip_through_peer() {
        let (factory, mut listener) = MemoryTransportFactory::new();
        let mut channel = factory.connect(&TransportConfig::memory()).await.unwrap();
        let mut peer = listener.accept().await.unwrap();

        channel
            .transport
            .send(TransportMessage::without_id(Bytes::from_static(b"{\"a\":1}")))
            .await
            .unwrap();
        assert_eq!(peer.recv_json().await, Some(serde_json::json!({"a": 1})));

        assert!(peer.send_raw("hello"));
        assert_eq!(
            channel.events.recv().await,
            Some(TransportEvent::Message(Bytes::from_static(b"hello")))
        );
        assert_eq!(channel.transport.metrics().messages_sent, 1);
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let (factory, listener) = MemoryTransportFactory::new();
        listener.refuse_connections(true);
        let err = factory.connect(&TransportConfig::memory()).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed(_)));
        assert_eq!(listener.connections(), 0);
    }

    #[tokio::test]
    async fn test_send_after_peer_close_is_not_connected() {
        let (factory, mut listener) = MemoryTransportFactory::new();
        let mut channel = factory.connect(&TransportConfig::memory()).await.unwrap();
        let peer = listener.accept().await.unwrap();

        peer.close(Some("done"));
        assert_eq!(
            channel.events.recv().await,
            Some(TransportEvent::Closed {
                reason: Some("done".to_string())
            })
        );
        let err = channel
            .transport
            .send(TransportMessage::without_id(Bytes::from_static(b"{}")))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::NotConnected);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (factory, mut listener) = MemoryTransportFactory::new();
        let mut channel = factory.connect(&TransportConfig::memory()).await.unwrap();
        let mut peer = listener.accept().await.unwrap();

        channel.transport.close().await.unwrap();
        channel.transport.close().await.unwrap();

        assert!(matches!(
            channel.events.recv().await,
            Some(TransportEvent::Closed { .. })
        ));
        assert_eq!(peer.recv().await, None);
        assert!(!peer.is_open());
    }
}
