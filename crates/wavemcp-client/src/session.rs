//! The MCP session: one logical connection to a server.
//!
//! A [`Session`] owns at most one transport channel at a time. All mutable state
//! (lifecycle state, pending requests, server details, the active connection)
//! lives in one `parking_lot` mutex that is never held across an `.await`.
//! Every connection gets a generation number; a reader task drains that
//! connection's events and anything it, or a request issued on it, tries to
//! apply after the generation moved on is discarded.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};
use wavemcp_protocol::types::{
    CallToolRequest, CallToolResult, GetPromptRequest, GetPromptResult, Implementation,
    InitializeRequest, InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    Prompt, ReadResourceRequest, ReadResourceResult, Resource, ServerCapabilities, Tool,
};
use wavemcp_protocol::{
    InboundMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ParseError, RequestId, methods,
};
use wavemcp_transport_traits::{
    Transport, TransportConfig, TransportError, TransportEvent, TransportFactory, TransportMessage,
    TransportMetrics,
};

use crate::cache::{CapabilityCache, ListKind, Snapshot};
use crate::config::SessionConfig;
use crate::correlator::{Correlator, Ticket};
use crate::diagnostics::{AtomicDiagnostics, SessionDiagnostics};
use crate::error::{SessionError, SessionResult};
use crate::router::NotificationRouter;
use crate::state::{ServerDetails, SessionState};

/// The open channel of the current generation
#[derive(Debug)]
struct Connection {
    transport: Arc<dyn Transport>,
    reader: JoinHandle<()>,
    endpoint: String,
}

impl Connection {
    async fn shutdown(self) {
        self.reader.abort();
        if let Err(e) = self.transport.close().await {
            debug!("Error closing connection to {}: {}", self.endpoint, e);
        }
    }
}

#[derive(Debug, Default)]
struct SessionCore {
    state: SessionState,
    generation: u64,
    connection: Option<Connection>,
    correlator: Correlator,
    server: Option<ServerDetails>,
    initializing: bool,
}

impl SessionCore {
    fn open_transport(&self) -> SessionResult<Arc<dyn Transport>> {
        match &self.connection {
            Some(connection) if connection.transport.is_open() => {
                Ok(Arc::clone(&connection.transport))
            }
            _ => Err(SessionError::NotConnected),
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    config: SessionConfig,
    factory: Arc<dyn TransportFactory>,
    core: Mutex<SessionCore>,
    state_tx: watch::Sender<SessionState>,
    server_tx: watch::Sender<Option<ServerDetails>>,
    last_error_tx: watch::Sender<Option<String>>,
    cache: CapabilityCache,
    router: NotificationRouter,
    diagnostics: AtomicDiagnostics,
}

/// Handle to an MCP session.
///
/// Cloning is cheap; all clones drive the same session.
///
/// ```rust,no_run
/// # async fn demo() -> wavemcp_client::SessionResult<()> {
/// use wavemcp_client::{Session, SessionConfig, TransportConfig};
///
/// let session = Session::websocket(SessionConfig::default());
/// session.connect(TransportConfig::websocket("ws://localhost:8080/mcp")).await?;
/// let init = session.initialize().await?;
/// println!("connected to {}", init.server_info);
///
/// for tool in session.tools().iter() {
///     println!("{}", tool.name);
/// }
/// session.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a disconnected session that opens channels with `factory`
    pub fn new(config: SessionConfig, factory: Arc<dyn TransportFactory>) -> Self {
        let router = NotificationRouter::new(config.notification_buffer);
        Self {
            inner: Arc::new(SessionInner {
                config,
                factory,
                core: Mutex::new(SessionCore::default()),
                state_tx: watch::channel(SessionState::Disconnected).0,
                server_tx: watch::channel(None).0,
                last_error_tx: watch::channel(None).0,
                cache: CapabilityCache::default(),
                router,
                diagnostics: AtomicDiagnostics::default(),
            }),
        }
    }

    /// Create a disconnected session that connects over WebSocket
    #[cfg(feature = "websocket")]
    pub fn websocket(config: SessionConfig) -> Self {
        Self::new(
            config,
            Arc::new(wavemcp_websocket::WebSocketTransportFactory::default()),
        )
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Open a transport channel.
    ///
    /// Legal from `Disconnected` and `Error`; any channel left over from a failed
    /// handshake is closed first. Fails with `ConnectError` (state `Error`) when the
    /// channel cannot be opened, and with `Disconnected` when [`disconnect`](Self::disconnect)
    /// is called before the channel opened.
    pub async fn connect(&self, config: TransportConfig) -> SessionResult<()> {
        let inner = &self.inner;
        let (generation, previous) = {
            let mut core = inner.core.lock();
            if !core.state.can_connect() {
                return Err(SessionError::AlreadyConnected);
            }
            let previous = inner.end_connection(&mut core);
            inner.set_last_error(None);
            inner.set_state(&mut core, SessionState::Connecting);
            (core.generation, previous)
        };
        if let Some(previous) = previous {
            debug!("Replacing connection to {}", previous.endpoint);
            previous.shutdown().await;
        }

        let endpoint = config
            .url
            .clone()
            .unwrap_or_else(|| config.transport_type.to_string());
        info!("Connecting to {}", endpoint);
        let result = inner.factory.connect(&config).await;

        let overtaken = {
            let mut core = inner.core.lock();
            if core.generation == generation {
                return match result {
                    Ok(channel) => {
                        let reader = spawn_reader(Arc::downgrade(inner), generation, channel.events);
                        core.connection = Some(Connection {
                            transport: channel.transport,
                            reader,
                            endpoint: endpoint.clone(),
                        });
                        inner.set_state(&mut core, SessionState::Connected);
                        info!("Connected to {}", endpoint);
                        Ok(())
                    }
                    Err(e) => {
                        warn!("Connection to {} failed: {}", endpoint, e);
                        inner.set_last_error(Some(e.to_string()));
                        inner.set_state(&mut core, SessionState::Error);
                        Err(SessionError::ConnectError(e))
                    }
                };
            }
            result
        };

        debug!("Connect to {} was overtaken by disconnect", endpoint);
        if let Ok(channel) = overtaken {
            let _ = channel.transport.close().await;
        }
        Err(SessionError::Disconnected)
    }

    /// Perform the MCP handshake.
    ///
    /// Only legal in `Connected`. On success the server details are recorded,
    /// `notifications/initialized` is sent, the three capability lists are refreshed
    /// concurrently (a failed refresh is logged, not fatal) and the session moves to
    /// `Initialized`. Any failure of the handshake itself moves the session to `Error`.
    pub async fn initialize(&self) -> SessionResult<InitializeResult> {
        let inner = &self.inner;
        let generation = {
            let mut core = inner.core.lock();
            if core.state != SessionState::Connected || core.initializing {
                return Err(SessionError::NotReady { state: core.state });
            }
            core.initializing = true;
            core.generation
        };

        let outcome = self.handshake(generation).await;

        let mut core = inner.core.lock();
        if core.generation != generation {
            return Err(SessionError::Disconnected);
        }
        core.initializing = false;
        match outcome {
            Ok(result) => {
                inner.set_state(&mut core, SessionState::Initialized);
                info!(
                    "Session initialized with {} (protocol {})",
                    result.server_info, result.protocol_version
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Initialization failed: {}", e);
                inner.set_last_error(Some(e.to_string()));
                inner.set_state(&mut core, SessionState::Error);
                Err(e)
            }
        }
    }

    async fn handshake(&self, generation: u64) -> SessionResult<InitializeResult> {
        let config = &self.inner.config;
        let request = InitializeRequest {
            protocol_version: config.protocol_version.clone(),
            capabilities: config.capabilities.clone(),
            client_info: config.client_info.clone(),
        };
        let (mut result, issued_on): (InitializeResult, u64) = self
            .request_typed(methods::INITIALIZE, Some(to_params(&request)?))
            .await?;
        if issued_on != generation {
            return Err(SessionError::Disconnected);
        }
        if result.protocol_version.is_empty() {
            debug!("Server omitted protocolVersion, assuming {}", config.protocol_version);
            result.protocol_version = config.protocol_version.clone();
        } else if result.protocol_version != config.protocol_version {
            debug!(
                "Server answered with protocol {} (requested {})",
                result.protocol_version, config.protocol_version
            );
        }

        self.notify(methods::INITIALIZED, None).await?;

        let details = ServerDetails::from(result.clone());
        self.inner
            .with_generation(generation, |core| {
                core.server = Some(details.clone());
                self.inner.server_tx.send_replace(Some(details));
            })
            .ok_or(SessionError::Disconnected)?;

        tokio::join!(
            self.refresh_logged(ListKind::Tools),
            self.refresh_logged(ListKind::Resources),
            self.refresh_logged(ListKind::Prompts),
        );
        Ok(result)
    }

    /// Close the channel and return to `Disconnected`.
    ///
    /// Rejects every pending request with `Disconnected`, clears server details, the
    /// capability lists and the last error. Calling it again is a no-op.
    pub async fn disconnect(&self) {
        let previous = {
            let mut core = self.inner.core.lock();
            let previous = self.inner.end_connection(&mut core);
            self.inner.set_last_error(None);
            self.inner.set_state(&mut core, SessionState::Disconnected);
            previous
        };
        if let Some(connection) = previous {
            info!("Disconnecting from {}", connection.endpoint);
            connection.shutdown().await;
        }
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    /// Send a request and wait for its result.
    ///
    /// Needs an open channel, not a completed handshake.
    pub async fn request(&self, method: &str, params: Option<Value>) -> SessionResult<Value> {
        self.send_request(method, params)
            .await
            .map(|(value, _)| value)
    }

    /// Send a notification
    pub async fn notify(&self, method: &str, params: Option<Value>) -> SessionResult<()> {
        let transport = self.inner.core.lock().open_transport()?;
        let payload = serde_json::to_vec(&JsonRpcNotification::new(method, params))?;
        transport
            .send(TransportMessage::without_id(Bytes::from(payload)))
            .await?;
        trace!("Sent notification {}", method);
        Ok(())
    }

    /// Invoke a tool
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> SessionResult<CallToolResult> {
        let request = CallToolRequest {
            name: name.to_string(),
            arguments,
        };
        self.request_typed(methods::TOOLS_CALL, Some(to_params(&request)?))
            .await
            .map(|(result, _)| result)
    }

    /// Read a resource by URI
    pub async fn read_resource(&self, uri: &str) -> SessionResult<ReadResourceResult> {
        let request = ReadResourceRequest {
            uri: uri.to_string(),
        };
        self.request_typed(methods::RESOURCES_READ, Some(to_params(&request)?))
            .await
            .map(|(result, _)| result)
    }

    /// Fetch a prompt, rendered with `arguments`
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> SessionResult<GetPromptResult> {
        let request = GetPromptRequest {
            name: name.to_string(),
            arguments,
        };
        self.request_typed(methods::PROMPTS_GET, Some(to_params(&request)?))
            .await
            .map(|(result, _)| result)
    }

    /// Re-fetch the tool list and replace the cached one
    pub async fn refresh_tools(&self) -> SessionResult<Snapshot<Tool>> {
        let (result, generation): (ListToolsResult, u64) =
            self.request_typed(methods::TOOLS_LIST, None).await?;
        self.inner
            .with_generation(generation, |_| self.inner.cache.replace_tools(result.tools))
            .ok_or(SessionError::Disconnected)
    }

    /// Re-fetch the resource list and replace the cached one
    pub async fn refresh_resources(&self) -> SessionResult<Snapshot<Resource>> {
        let (result, generation): (ListResourcesResult, u64) =
            self.request_typed(methods::RESOURCES_LIST, None).await?;
        self.inner
            .with_generation(generation, |_| {
                self.inner.cache.replace_resources(result.resources)
            })
            .ok_or(SessionError::Disconnected)
    }

    /// Re-fetch the prompt list and replace the cached one
    pub async fn refresh_prompts(&self) -> SessionResult<Snapshot<Prompt>> {
        let (result, generation): (ListPromptsResult, u64) =
            self.request_typed(methods::PROMPTS_LIST, None).await?;
        self.inner
            .with_generation(generation, |_| self.inner.cache.replace_prompts(result.prompts))
            .ok_or(SessionError::Disconnected)
    }

    async fn refresh(&self, kind: ListKind) -> SessionResult<usize> {
        match kind {
            ListKind::Tools => self.refresh_tools().await.map(|list| list.len()),
            ListKind::Resources => self.refresh_resources().await.map(|list| list.len()),
            ListKind::Prompts => self.refresh_prompts().await.map(|list| list.len()),
        }
    }

    async fn refresh_logged(&self, kind: ListKind) {
        match self.refresh(kind).await {
            Ok(count) => debug!("Refreshed {} ({} entries)", kind, count),
            Err(e) => {
                AtomicDiagnostics::bump(&self.inner.diagnostics.refresh_failures);
                error!("Failed to refresh {}: {}", kind, e);
            }
        }
    }

    async fn request_typed<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> SessionResult<(R, u64)> {
        let (value, generation) = self.send_request(method, params).await?;
        let result = serde_json::from_value(value)
            .map_err(|e| SessionError::MalformedMessage(format!("{method} result: {e}")))?;
        Ok((result, generation))
    }

    /// Register, send and await one request; yields the result and the generation it ran on
    async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> SessionResult<(Value, u64)> {
        let inner = &self.inner;
        let timeout = inner.config.request_timeout;
        let (generation, transport, ticket) = {
            let mut core = inner.core.lock();
            let transport = core.open_transport()?;
            let ticket = core.correlator.register(method, Instant::now() + timeout);
            (core.generation, transport, ticket)
        };
        let Ticket {
            id,
            deadline,
            response,
        } = ticket;

        let sent = match serde_json::to_vec(&JsonRpcRequest::new(id.clone(), method, params)) {
            Ok(payload) => transport
                .send(TransportMessage::new(id.clone(), Bytes::from(payload)))
                .await
                .map_err(SessionError::from),
            Err(e) => Err(SessionError::from(e)),
        };
        if let Err(e) = sent {
            inner.with_generation(generation, |core| core.correlator.cancel(&id));
            return Err(e);
        }
        AtomicDiagnostics::bump(&inner.diagnostics.requests_sent);
        trace!("Sent {} (id {})", method, id);

        match tokio::time::timeout_at(deadline, response).await {
            Ok(Ok(outcome)) => outcome.map(|value| (value, generation)),
            Ok(Err(_)) => Err(SessionError::Disconnected),
            Err(_) => {
                inner.with_generation(generation, |core| {
                    core.correlator.expire(&id, Instant::now())
                });
                AtomicDiagnostics::bump(&inner.diagnostics.requests_timed_out);
                warn!("Request {} (id {}) timed out after {:?}", method, id, timeout);
                Err(SessionError::RequestTimeout {
                    method: method.to_string(),
                    timeout,
                })
            }
        }
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.core.lock().state
    }

    /// Whether a channel is open (`Connected` or `Initialized`)
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Server name and version, once initialized
    pub fn server_info(&self) -> Option<Implementation> {
        self.inner
            .core
            .lock()
            .server
            .as_ref()
            .map(|details| details.server_info.clone())
    }

    /// Capabilities the server declared, once initialized
    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.inner
            .core
            .lock()
            .server
            .as_ref()
            .map(|details| details.capabilities.clone())
    }

    /// Everything the handshake recorded, once initialized
    pub fn server_details(&self) -> Option<ServerDetails> {
        self.inner.core.lock().server.clone()
    }

    /// Message of the last connect, handshake or channel failure
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error_tx.borrow().clone()
    }

    /// Cached tool list
    pub fn tools(&self) -> Snapshot<Tool> {
        self.inner.cache.tools()
    }

    /// Cached resource list
    pub fn resources(&self) -> Snapshot<Resource> {
        self.inner.cache.resources()
    }

    /// Cached prompt list
    pub fn prompts(&self) -> Snapshot<Prompt> {
        self.inner.cache.prompts()
    }

    /// Endpoint of the open channel
    pub fn endpoint(&self) -> Option<String> {
        let core = self.inner.core.lock();
        let connection = core.connection.as_ref()?;
        connection
            .transport
            .endpoint()
            .or_else(|| Some(connection.endpoint.clone()))
    }

    /// Traffic counters of the open channel
    pub fn transport_metrics(&self) -> Option<TransportMetrics> {
        let core = self.inner.core.lock();
        core.connection.as_ref().map(|c| c.transport.metrics())
    }

    /// Number of requests awaiting a response
    pub fn pending_requests(&self) -> usize {
        self.inner.core.lock().correlator.len()
    }

    /// Observe state transitions
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Observe server details being recorded and cleared
    pub fn watch_server(&self) -> watch::Receiver<Option<ServerDetails>> {
        self.inner.server_tx.subscribe()
    }

    /// Observe the last error
    pub fn watch_last_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.last_error_tx.subscribe()
    }

    /// Observe the tool list
    pub fn watch_tools(&self) -> watch::Receiver<Snapshot<Tool>> {
        self.inner.cache.watch_tools()
    }

    /// Observe the resource list
    pub fn watch_resources(&self) -> watch::Receiver<Snapshot<Resource>> {
        self.inner.cache.watch_resources()
    }

    /// Observe the prompt list
    pub fn watch_prompts(&self) -> watch::Receiver<Snapshot<Prompt>> {
        self.inner.cache.watch_prompts()
    }

    /// Receive every notification the server sends from now on
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<JsonRpcNotification> {
        self.inner.router.subscribe()
    }

    /// Counters for traffic the session handled internally
    pub fn diagnostics(&self) -> SessionDiagnostics {
        self.inner.diagnostics.snapshot()
    }
}

impl SessionInner {
    fn set_state(&self, core: &mut SessionCore, state: SessionState) {
        if core.state == state {
            return;
        }
        debug!("Session state {} -> {}", core.state, state);
        core.state = state;
        self.state_tx.send_replace(state);
    }

    fn set_last_error(&self, message: Option<String>) {
        self.last_error_tx.send_if_modified(|current| {
            if *current == message {
                return false;
            }
            *current = message;
            true
        });
    }

    /// Run `f` only if `generation` is still the current connection
    fn with_generation<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut SessionCore) -> R,
    ) -> Option<R> {
        let mut core = self.core.lock();
        (core.generation == generation).then(|| f(&mut core))
    }

    /// Retire the current generation: reject pending requests, forget the server and
    /// empty the lists. Returns the channel for the caller to shut down.
    fn end_connection(&self, core: &mut SessionCore) -> Option<Connection> {
        core.generation += 1;
        core.initializing = false;
        let rejected = core.correlator.reset();
        if rejected > 0 {
            debug!("Rejected {} pending requests", rejected);
        }
        if core.server.take().is_some() {
            self.server_tx.send_replace(None);
        }
        self.cache.clear();
        core.connection.take()
    }

    /// The channel of `generation` ended without the caller asking for it
    fn connection_lost(
        &self,
        generation: u64,
        error: Option<TransportError>,
        reason: Option<String>,
    ) {
        let mut core = self.core.lock();
        if core.generation != generation {
            return;
        }
        let endpoint = self
            .end_connection(&mut core)
            .map(|connection| connection.endpoint)
            .unwrap_or_default();
        match error {
            None => {
                info!(
                    "Connection to {} closed by peer ({})",
                    endpoint,
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.set_state(&mut core, SessionState::Disconnected);
            }
            Some(e) => {
                error!("Connection to {} failed: {}", endpoint, e);
                self.set_last_error(Some(e.to_string()));
                self.set_state(&mut core, SessionState::Error);
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.core.lock().generation == generation
    }

    fn handle_payload(self: &Arc<Self>, generation: u64, payload: &[u8]) {
        match InboundMessage::parse(payload) {
            Ok(InboundMessage::Response(response)) => self.handle_response(generation, response),
            Ok(InboundMessage::Notification(notification)) => {
                if !self.is_current(generation) {
                    return;
                }
                AtomicDiagnostics::bump(&self.diagnostics.notifications_received);
                if let Some(kind) = self.router.route(notification) {
                    let session = Session {
                        inner: Arc::clone(self),
                    };
                    tokio::spawn(async move { session.refresh_logged(kind).await });
                }
            }
            Err(ParseError::UnexpectedRequest { id, method }) => {
                self.reject_server_request(generation, id, &method);
            }
            Err(e) => {
                AtomicDiagnostics::bump(&self.diagnostics.malformed_messages);
                warn!("Dropping malformed message: {}", e);
            }
        }
    }

    fn handle_response(&self, generation: u64, response: JsonRpcResponse) {
        let Some(id) = response.request_id().cloned() else {
            AtomicDiagnostics::bump(&self.diagnostics.unmatched_responses);
            warn!(
                "Dropping response with null id: {}",
                response
                    .error()
                    .map_or_else(|| "no error".to_string(), ToString::to_string)
            );
            return;
        };

        let resolved = self
            .with_generation(generation, |core| {
                core.correlator.resolve(&id, response.into_outcome())
            })
            .unwrap_or(false);

        if resolved {
            AtomicDiagnostics::bump(&self.diagnostics.responses_matched);
            trace!("Resolved request {}", id);
        } else {
            AtomicDiagnostics::bump(&self.diagnostics.unmatched_responses);
            debug!("Dropping response for unknown request id {}", id);
        }
    }

    fn reject_server_request(&self, generation: u64, id: RequestId, method: &str) {
        AtomicDiagnostics::bump(&self.diagnostics.server_requests_rejected);
        warn!("Rejecting unsupported server request {} (id {})", method, id);

        let Some(Ok(transport)) = self.with_generation(generation, |core| core.open_transport())
        else {
            return;
        };
        let reply = JsonRpcResponse::failure(id, JsonRpcError::method_not_found(method));
        let payload = match serde_json::to_vec(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode error reply: {}", e);
                return;
            }
        };
        tokio::spawn(async move {
            if let Err(e) = transport
                .send(TransportMessage::without_id(Bytes::from(payload)))
                .await
            {
                debug!("Failed to answer server request: {}", e);
            }
        });
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(connection) = self.core.get_mut().connection.take() {
            connection.reader.abort();
        }
    }
}

fn to_params<P: Serialize>(params: &P) -> SessionResult<Value> {
    serde_json::to_value(params).map_err(SessionError::from)
}

/// Drain one connection's events until its terminal event
fn spawn_reader(
    session: Weak<SessionInner>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = events.recv().await;
            let Some(inner) = session.upgrade() else {
                break;
            };
            match event {
                Some(TransportEvent::Message(payload)) => {
                    trace!("Received {} bytes", payload.len());
                    inner.handle_payload(generation, &payload);
                }
                Some(TransportEvent::Closed { reason }) => {
                    inner.connection_lost(generation, None, reason);
                    break;
                }
                Some(TransportEvent::Error { error }) => {
                    inner.connection_lost(generation, Some(error), None);
                    break;
                }
                None => {
                    inner.connection_lost(generation, None, None);
                    break;
                }
            }
        }
        trace!("Reader for connection generation {} finished", generation);
    })
}
