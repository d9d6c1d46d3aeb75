//! Background tasks for the WebSocket transport.
//!
//! The reader task is the single consumer of the socket's read half. The
//! keep-alive task is optional. Both stop on the shutdown broadcast.

use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt as _, StreamExt as _};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use wavemcp_transport_traits::{TransportError, TransportState};

use crate::types::{WebSocketReader, WebSocketTransport};

impl WebSocketTransport {
    /// Spawn the reader task.
    ///
    /// Text and binary frames are published as messages. A close frame or end of
    /// stream publishes `Closed`; a socket error publishes `Error`. Either ends the task.
    pub(crate) fn spawn_reader_task(&self, mut reader: WebSocketReader) -> JoinHandle<()> {
        let writer = self.writer.clone();
        let state = self.state.clone();
        let emitter = self.emitter.clone();
        let metrics = self.metrics.clone();
        let limits = self.limits;
        let session_id = self.session_id.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            debug!("Message reader task started for session {}", session_id);

            let deliver = |payload: Bytes| {
                if let Err(e) = limits.check_inbound(payload.len()) {
                    metrics.record_dropped();
                    warn!("Dropping inbound frame in session {}: {}", session_id, e);
                    return;
                }
                metrics.record_received(payload.len());
                emitter.emit_message(payload);
            };

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Message reader received shutdown signal for session {}", session_id);
                        break;
                    }

                    msg = reader.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                trace!("Received {} byte text frame in session {}", text.len(), session_id);
                                deliver(Bytes::copy_from_slice(text.as_bytes()));
                            }
                            Some(Ok(Message::Binary(data))) => {
                                trace!("Received {} byte binary frame in session {}", data.len(), session_id);
                                deliver(data);
                            }
                            Some(Ok(Message::Ping(data))) => {
                                if let Some(ref mut w) = *writer.lock().await
                                    && w.send(Message::Pong(data)).await.is_ok()
                                {
                                    trace!("Message reader sent pong in session {}", session_id);
                                }
                            }
                            Some(Ok(Message::Pong(_))) => {
                                trace!("Message reader received pong in session {}", session_id);
                            }
                            Some(Ok(Message::Close(frame))) => {
                                let reason = frame
                                    .map(|f| f.reason.as_str().to_string())
                                    .filter(|r| !r.is_empty());
                                info!("WebSocket closed by peer in session {} ({:?})", session_id, reason);
                                *state.lock() = TransportState::Disconnected;
                                emitter.emit_closed(reason);
                                break;
                            }
                            Some(Ok(Message::Frame(_))) => {
                                trace!("Message reader received raw frame in session {}", session_id);
                            }
                            Some(Err(e)) => {
                                warn!("WebSocket error in session {}: {}", session_id, e);
                                *state.lock() = TransportState::Failed { reason: e.to_string() };
                                emitter.emit_error(TransportError::ConnectionLost(e.to_string()));
                                break;
                            }
                            None => {
                                info!("WebSocket stream ended for session {}", session_id);
                                *state.lock() = TransportState::Disconnected;
                                emitter.emit_closed(None);
                                break;
                            }
                        }
                    }
                }
            }

            debug!("Message reader task terminated for session {}", session_id);
        })
    }

    /// Spawn keep-alive task to send periodic ping messages.
    pub(crate) fn spawn_keep_alive_task(&self, interval: Duration) -> JoinHandle<()> {
        let writer = self.writer.clone();
        let state = self.state.clone();
        let session_id = self.session_id.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            let mut ping_count = 0u64;

            debug!(
                "Keep-alive task started for session {} with interval {:?}",
                session_id, interval
            );

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Keep-alive task received shutdown signal for session {}", session_id);
                        break;
                    }

                    _ = ticker.tick() => {
                        if *state.lock() != TransportState::Connected {
                            break;
                        }

                        if let Some(ref mut w) = *writer.lock().await {
                            ping_count += 1;
                            let ping_data = format!("ping-{}-{}", session_id, ping_count);
                            match w.send(Message::Ping(Bytes::from(ping_data))).await {
                                Ok(()) => trace!("Keep-alive ping {} sent for session {}", ping_count, session_id),
                                Err(e) => warn!("Keep-alive ping failed for session {}: {}", session_id, e),
                            }
                        }
                    }
                }
            }

            debug!("Keep-alive task terminated for session {}", session_id);
        })
    }
}
