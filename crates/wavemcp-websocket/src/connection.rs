//! Connection establishment.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt as _;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wavemcp_transport_traits::{
    AtomicMetrics, TransportChannel, TransportConfig, TransportError, TransportEventEmitter,
    TransportFactory, TransportResult, TransportState, TransportType,
};

use crate::config::WebSocketConfig;
use crate::types::WebSocketTransport;

/// Opens WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransportFactory {
    config: WebSocketConfig,
}

impl WebSocketTransportFactory {
    /// Creates a factory with WebSocket-specific options.
    pub fn new(config: WebSocketConfig) -> Self {
        Self { config }
    }
}

/// Builds the upgrade request, applying configured headers.
fn build_request(url: &str, config: &TransportConfig) -> TransportResult<Request> {
    let mut request = url
        .into_client_request()
        .map_err(|e| TransportError::ConfigurationError(format!("Invalid WebSocket URL: {e}")))?;

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            TransportError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            TransportError::ConfigurationError(format!("Invalid value for header '{name}': {e}"))
        })?;
        request.headers_mut().insert(header_name, header_value);
    }

    Ok(request)
}

#[async_trait]
impl TransportFactory for WebSocketTransportFactory {
    fn transport_type(&self) -> TransportType {
        TransportType::WebSocket
    }

    async fn connect(&self, config: &TransportConfig) -> TransportResult<TransportChannel> {
        let url = config.url.as_deref().ok_or_else(|| {
            TransportError::ConfigurationError("WebSocket URL is required".to_string())
        })?;
        let request = build_request(url, config)?;
        let session_id = Uuid::new_v4().to_string();

        info!("Connecting to WebSocket server at {} (session {})", url, session_id);

        let (stream, _response) =
            match tokio::time::timeout(config.connect_timeout, connect_async(request)).await {
                Ok(Ok(connected)) => connected,
                Ok(Err(e)) => {
                    warn!("WebSocket connection to {} failed: {}", url, e);
                    return Err(TransportError::ConnectionFailed(format!(
                        "WebSocket connection failed: {e}"
                    )));
                }
                Err(_) => {
                    warn!(
                        "WebSocket connection to {} timed out after {:?}",
                        url, config.connect_timeout
                    );
                    return Err(TransportError::ConnectionTimeout {
                        timeout: config.connect_timeout,
                    });
                }
            };

        let (writer, reader) = stream.split();
        let (emitter, events) = TransportEventEmitter::new();
        let (shutdown_tx, _) = broadcast::channel(1);

        let transport = WebSocketTransport {
            session_id,
            url: url.to_string(),
            state: Arc::new(Mutex::new(TransportState::Connected)),
            writer: Arc::new(tokio::sync::Mutex::new(Some(writer))),
            emitter,
            shutdown_tx,
            metrics: Arc::new(AtomicMetrics::new()),
            limits: config.limits,
            task_handles: Mutex::new(Vec::new()),
        };

        let mut handles = vec![transport.spawn_reader_task(reader)];
        if let Some(interval) = self.config.keep_alive_interval {
            handles.push(transport.spawn_keep_alive_task(interval));
        }
        debug!(
            "Started {} background tasks for session {}",
            handles.len(),
            transport.session_id
        );
        *transport.task_handles.lock() = handles;

        info!("WebSocket client connected (session {})", transport.session_id);

        Ok(TransportChannel {
            transport: Arc::new(transport),
            events,
        })
    }
}
