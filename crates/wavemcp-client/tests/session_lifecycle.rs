//! Lifecycle: connect, handshake, disconnect, peer close and channel failure.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Reply, connect, demo_reply, demo_server, handler, wait_for_state};
use pretty_assertions::assert_eq;
use serde_json::json;
use wavemcp_client::{
    MemoryTransportFactory, Session, SessionConfig, SessionError, SessionState, TransportConfig,
};

#[tokio::test]
async fn connect_while_connected_is_rejected() {
    let harness = connect(demo_server()).await;
    let session = &harness.session;
    assert_eq!(session.state(), SessionState::Connected);

    let err = session.connect(TransportConfig::memory()).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyConnected));
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(harness.listener.connections(), 1);
}

#[tokio::test]
async fn connect_while_connecting_is_rejected() {
    let (factory, listener) = MemoryTransportFactory::new();
    listener.set_connect_delay(Duration::from_millis(200));
    let session = Session::new(SessionConfig::default(), Arc::new(factory));

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.connect(TransportConfig::memory()).await }
    });
    wait_for_state(&session, SessionState::Connecting).await;

    let err = session.connect(TransportConfig::memory()).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyConnected));
    assert_eq!(session.state(), SessionState::Connecting);

    first.await.unwrap().unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(listener.connections(), 1);
}

#[tokio::test]
async fn connect_while_initialized_is_rejected() {
    let harness = connect(demo_server()).await;
    let session = &harness.session;
    session.initialize().await.unwrap();

    let err = session.connect(TransportConfig::memory()).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyConnected));
    assert_eq!(session.state(), SessionState::Initialized);
    assert_eq!(session.tools().len(), 1);
    assert_eq!(session.server_info().unwrap().name, "demo");
    assert_eq!(harness.listener.connections(), 1);
}

#[tokio::test]
async fn handshake_tolerates_a_bare_server_info() {
    let harness = connect(handler(|method, params| match method {
        "initialize" => Reply::Result(json!({"serverInfo": {"name": "demo", "version": "1.0"}})),
        _ => demo_reply(method, params),
    }))
    .await;
    let session = &harness.session;

    let result = session.initialize().await.unwrap();
    assert_eq!(result.protocol_version, "2024-11-05");
    assert_eq!(session.state(), SessionState::Initialized);
    assert_eq!(session.last_error(), None);

    let details = session.server_details().unwrap();
    assert_eq!(details.server_info.name, "demo");
    assert_eq!(details.protocol_version, "2024-11-05");
    assert!(details.capabilities.offered().is_empty());
}

#[tokio::test]
async fn initialize_requires_an_open_channel() {
    let (factory, _listener) = MemoryTransportFactory::new();
    let session = Session::new(SessionConfig::default(), Arc::new(factory));

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::NotReady {
            state: SessionState::Disconnected
        }
    ));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(session.last_error(), None);
    assert_eq!(session.diagnostics().requests_sent, 0);
}

#[tokio::test]
async fn handshake_records_server_and_fills_lists() {
    let mut harness = connect(demo_server()).await;
    let session = &harness.session;

    let result = session.initialize().await.unwrap();
    assert_eq!(result.server_info.name, "demo");
    assert_eq!(session.state(), SessionState::Initialized);

    let info = session.server_info().unwrap();
    assert_eq!((info.name.as_str(), info.version.as_str()), ("demo", "1.0"));
    let details = session.server_details().unwrap();
    assert_eq!(details.protocol_version, "2024-11-05");
    assert_eq!(details.instructions.as_deref(), Some("be nice"));
    assert!(session.server_capabilities().unwrap().tools.is_some());

    let tools = session.tools();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "echo");
    assert_eq!(session.resources()[0].uri, "file:///readme.md");
    assert_eq!(session.prompts()[0].name, "greet");

    // initialize, notifications/initialized and three list requests
    assert_eq!(session.transport_metrics().unwrap().messages_sent, 5);

    let init = harness.server.next_received().await;
    assert_eq!(init["id"], json!(1));
    assert_eq!(init["method"], "initialize");
    assert_eq!(init["params"]["protocolVersion"], "2024-11-05");
    assert_eq!(
        init["params"]["capabilities"],
        json!({"roots": {"listChanged": true}, "sampling": {}})
    );
    assert_eq!(init["params"]["clientInfo"]["name"], "wavemcp");

    let initialized = harness.server.next_received().await;
    assert_eq!(
        initialized,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
    );
}

#[tokio::test]
async fn failed_refresh_does_not_block_the_handshake() {
    let harness = connect(handler(|method, params| match method {
        "prompts/list" => Reply::Error(-32601, "Method not found"),
        _ => demo_reply(method, params),
    }))
    .await;
    let session = &harness.session;

    session.initialize().await.unwrap();

    assert_eq!(session.state(), SessionState::Initialized);
    assert_eq!(session.tools().len(), 1);
    assert_eq!(session.resources().len(), 1);
    assert!(session.prompts().is_empty());
    assert_eq!(session.diagnostics().refresh_failures, 1);
}

#[tokio::test]
async fn rejected_handshake_moves_to_error_and_allows_reconnect() {
    let mut harness = connect(handler(|method, params| match method {
        "initialize" => Reply::Error(-32602, "Unsupported protocol version"),
        _ => demo_reply(method, params),
    }))
    .await;
    let session = harness.session.clone();

    let err = session.initialize().await.unwrap_err();
    assert_eq!(err.code(), Some(-32602));
    assert_eq!(session.state(), SessionState::Error);
    assert!(
        session
            .last_error()
            .unwrap()
            .contains("Unsupported protocol version")
    );
    assert_eq!(session.server_info(), None);

    // A second handshake attempt is not allowed from Error.
    assert!(matches!(
        session.initialize().await,
        Err(SessionError::NotReady {
            state: SessionState::Error
        })
    ));

    session.connect(TransportConfig::memory()).await.unwrap();
    let _server = common::accept(&mut harness.listener, demo_server()).await;
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(session.last_error(), None);

    session.initialize().await.unwrap();
    assert_eq!(session.state(), SessionState::Initialized);
    assert_eq!(harness.listener.connections(), 2);
}

#[tokio::test]
async fn disconnect_rejects_pending_and_clears_everything() {
    let harness = connect(handler(|method, params| match method {
        "tools/call" => Reply::Silent,
        _ => demo_reply(method, params),
    }))
    .await;
    let session = harness.session.clone();
    session.initialize().await.unwrap();

    let call = tokio::spawn({
        let session = session.clone();
        async move { session.call_tool("slow", None).await }
    });
    common::eventually(|| session.pending_requests() == 1).await;

    session.disconnect().await;

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(err, SessionError::Disconnected));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(session.server_info(), None);
    assert!(session.tools().is_empty());
    assert!(session.resources().is_empty());
    assert!(session.prompts().is_empty());
    assert_eq!(session.last_error(), None);
    assert_eq!(session.pending_requests(), 0);

    // Idempotent.
    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn requests_need_a_channel_not_a_handshake() {
    let harness = connect(demo_server()).await;
    let session = &harness.session;

    let result = session
        .call_tool("echo", Some(json!({"text": "hello"})))
        .await
        .unwrap();
    assert_eq!(result.text(), "hello");
    assert!(!result.is_error());
    assert_eq!(session.state(), SessionState::Connected);

    session.disconnect().await;
    let err = session.call_tool("echo", None).await.unwrap_err();
    assert!(matches!(err, SessionError::NotConnected));
}

#[tokio::test]
async fn peer_close_returns_to_disconnected() {
    let harness = connect(handler(|method, params| match method {
        "resources/read" => Reply::Silent,
        _ => demo_reply(method, params),
    }))
    .await;
    let session = harness.session.clone();
    session.initialize().await.unwrap();

    let read = tokio::spawn({
        let session = session.clone();
        async move { session.read_resource("file:///big.bin").await }
    });
    common::eventually(|| session.pending_requests() == 1).await;

    harness.server.close(Some("server shutting down"));
    wait_for_state(&session, SessionState::Disconnected).await;

    assert!(matches!(
        read.await.unwrap(),
        Err(SessionError::Disconnected)
    ));
    assert_eq!(session.last_error(), None);
    assert_eq!(session.server_info(), None);
    assert!(session.tools().is_empty());
}

#[tokio::test]
async fn channel_error_moves_to_error() {
    let harness = connect(demo_server()).await;
    let session = harness.session.clone();
    session.initialize().await.unwrap();

    harness.server.fail("connection reset by peer");
    wait_for_state(&session, SessionState::Error).await;

    assert!(
        session
            .last_error()
            .unwrap()
            .contains("connection reset by peer")
    );
    assert_eq!(session.server_info(), None);
    assert!(session.prompts().is_empty());
    assert!(!session.is_connected());
}

#[tokio::test]
async fn failed_connect_sets_error_and_next_connect_clears_it() {
    let (factory, mut listener) = MemoryTransportFactory::new();
    let session = Session::new(SessionConfig::default(), Arc::new(factory));

    listener.refuse_connections(true);
    let err = session.connect(TransportConfig::memory()).await.unwrap_err();
    assert!(matches!(err, SessionError::ConnectError(_)));
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.last_error().unwrap().contains("connection refused"));

    listener.refuse_connections(false);
    session.connect(TransportConfig::memory()).await.unwrap();
    let _server = common::accept(&mut listener, demo_server()).await;
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn connect_overtaken_by_disconnect() {
    let (factory, listener) = MemoryTransportFactory::new();
    listener.set_connect_delay(Duration::from_millis(200));
    let session = Session::new(SessionConfig::default(), Arc::new(factory));

    let connecting = tokio::spawn({
        let session = session.clone();
        async move { session.connect(TransportConfig::memory()).await }
    });
    wait_for_state(&session, SessionState::Connecting).await;

    session.disconnect().await;
    assert_eq!(session.state(), SessionState::Disconnected);

    let err = connecting.await.unwrap().unwrap_err();
    assert!(matches!(err, SessionError::Disconnected));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn state_transitions_are_observable() {
    let harness = connect(demo_server()).await;
    let session = &harness.session;
    let mut states = session.watch_state();
    assert_eq!(*states.borrow_and_update(), SessionState::Connected);

    session.initialize().await.unwrap();
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), SessionState::Initialized);

    let mut server = session.watch_server();
    assert_eq!(
        Option::as_ref(&*server.borrow_and_update()).map(|d| d.server_info.name.clone()),
        Some("demo".to_string())
    );

    session.disconnect().await;
    assert_eq!(*states.borrow_and_update(), SessionState::Disconnected);
    assert!(server.has_changed().unwrap());
    assert!(server.borrow_and_update().is_none());
    assert_eq!(session.transport_metrics(), None);
}

#[tokio::test]
async fn prompts_render_with_arguments() {
    let harness = connect(handler(|method, params| match method {
        "prompts/get" => {
            let who = params
                .and_then(|p| p["arguments"]["who"].as_str())
                .unwrap_or("nobody");
            Reply::Result(json!({
                "description": "greeting",
                "messages": [{"role": "user", "content": {"type": "text", "text": format!("hi {who}")}}]
            }))
        }
        _ => demo_reply(method, params),
    }))
    .await;
    let session = &harness.session;
    session.initialize().await.unwrap();

    let rendered = session
        .get_prompt("greet", Some(json!({"who": "ada"})))
        .await
        .unwrap();
    assert_eq!(rendered.description.as_deref(), Some("greeting"));
    assert_eq!(rendered.messages.len(), 1);
    assert_eq!(rendered.messages[0].content.as_text(), Some("hi ada"));

    let bare = session.get_prompt("greet", None).await.unwrap();
    assert_eq!(bare.messages[0].content.as_text(), Some("hi nobody"));
}
