//! `Transport` implementation for WebSocket connections.

use std::time::Instant;

use async_trait::async_trait;
use futures::SinkExt as _;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use wavemcp_transport_traits::{
    Transport, TransportError, TransportMessage, TransportMetrics, TransportResult,
    TransportState, TransportType,
};

use crate::types::WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::WebSocket
    }

    fn state(&self) -> TransportState {
        self.state.lock().clone()
    }

    async fn send(&self, message: TransportMessage) -> TransportResult<()> {
        if !self.is_open() {
            return Err(TransportError::NotConnected);
        }
        let size = message.size();
        self.limits.check_outbound(size)?;

        let text = String::from_utf8(message.payload.to_vec()).map_err(|e| {
            TransportError::SerializationFailed(format!("payload is not UTF-8: {e}"))
        })?;

        let start = Instant::now();
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::NotConnected)?;
        writer
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        drop(guard);

        self.metrics.record_sent(size, start.elapsed());
        trace!(
            "Sent {} bytes (id {:?}) in session {}",
            size, message.id, self.session_id
        );
        Ok(())
    }

    async fn close(&self) -> TransportResult<()> {
        let writer = self.writer.lock().await.take();
        let Some(mut writer) = writer else {
            return Ok(());
        };

        {
            let mut state = self.state.lock();
            if *state == TransportState::Connected {
                *state = TransportState::Disconnected;
            }
        }

        let _ = self.shutdown_tx.send(());
        let handles = std::mem::take(&mut *self.task_handles.lock());
        for handle in handles {
            handle.abort();
        }
        // Terminal event goes out before the close frame so the peer's reply cannot claim it.
        if !self
            .emitter
            .emit_closed(Some("closed by client".to_string()))
        {
            trace!("Connection in session {} had already terminated", self.session_id);
        }
        if let Err(e) = writer.send(Message::Close(None)).await {
            debug!("Close frame not delivered in session {}: {}", self.session_id, e);
        }

        debug!("WebSocket session {} closed", self.session_id);
        Ok(())
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.snapshot()
    }

    fn endpoint(&self) -> Option<String> {
        Some(self.url.clone())
    }
}
