//! Scripted in-process MCP server for session tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use wavemcp_client::{
    MemoryListener, MemoryPeer, MemoryTransportFactory, Session, SessionConfig, SessionState,
    TransportConfig,
};

/// What the scripted server does with one request
pub enum Reply {
    Result(Value),
    Error(i32, &'static str),
    /// Never answer
    Silent,
}

pub type Handler = Arc<dyn Fn(&str, Option<&Value>) -> Reply + Send + Sync>;

enum Control {
    Send(Value),
    Close(Option<String>),
    Fail(String),
}

/// Handle to a running scripted server connection
pub struct ServerHandle {
    control: mpsc::UnboundedSender<Control>,
    received: mpsc::UnboundedReceiver<Value>,
}

impl ServerHandle {
    /// Push a raw JSON value to the client
    pub fn send(&self, value: Value) {
        let _ = self.control.send(Control::Send(value));
    }

    pub fn notify(&self, method: &str, params: Option<Value>) {
        let mut message = json!({"jsonrpc": "2.0", "method": method});
        if let Some(params) = params {
            message["params"] = params;
        }
        self.send(message);
    }

    pub fn close(&self, reason: Option<&str>) {
        let _ = self.control.send(Control::Close(reason.map(str::to_string)));
    }

    pub fn fail(&self, message: &str) {
        let _ = self.control.send(Control::Fail(message.to_string()));
    }

    /// Next message the client sent
    pub async fn next_received(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for client message")
            .expect("server task ended")
    }

    /// Skip client messages until one with `method` arrives
    pub async fn wait_for(&mut self, method: &str) -> Value {
        loop {
            let message = self.next_received().await;
            if message["method"] == method {
                return message;
            }
        }
    }
}

pub fn spawn_server(mut peer: MemoryPeer, handler: Handler) -> ServerHandle {
    let (control, mut control_rx) = mpsc::unbounded_channel();
    let (received_tx, received) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                message = peer.recv_json() => {
                    let Some(message) = message else { break };
                    let _ = received_tx.send(message.clone());
                    let (Some(id), Some(method)) =
                        (message.get("id"), message.get("method").and_then(Value::as_str))
                    else {
                        continue;
                    };
                    let reply = match handler(method, message.get("params")) {
                        Reply::Result(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                        Reply::Error(code, text) => json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": {"code": code, "message": text}
                        }),
                        Reply::Silent => continue,
                    };
                    peer.send_json(&reply);
                }
                command = control_rx.recv() => match command {
                    Some(Control::Send(value)) => { peer.send_json(&value); }
                    Some(Control::Close(reason)) => peer.close(reason.as_deref()),
                    Some(Control::Fail(message)) => peer.fail(&message),
                    None => break,
                }
            }
        }
    });

    ServerHandle { control, received }
}

/// Wrap a closure as a request handler
pub fn handler(f: impl Fn(&str, Option<&Value>) -> Reply + Send + Sync + 'static) -> Handler {
    Arc::new(f)
}

/// A server named `demo` 1.0 with one tool, one resource and one prompt
pub fn demo_server() -> Handler {
    Arc::new(demo_reply)
}

pub fn demo_reply(method: &str, params: Option<&Value>) -> Reply {
    match method {
        "initialize" => Reply::Result(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {"listChanged": true},
                "resources": {"listChanged": true},
                "prompts": {"listChanged": true}
            },
            "serverInfo": {"name": "demo", "version": "1.0"},
            "instructions": "be nice"
        })),
        "tools/list" => Reply::Result(json!({
            "tools": [{"name": "echo", "inputSchema": {"type": "object"}}]
        })),
        "resources/list" => Reply::Result(json!({
            "resources": [{"uri": "file:///readme.md", "name": "readme", "mimeType": "text/markdown"}]
        })),
        "prompts/list" => Reply::Result(json!({
            "prompts": [{"name": "greet", "arguments": [{"name": "who", "required": true}]}]
        })),
        "tools/call" => {
            let text = params
                .and_then(|p| p["arguments"]["text"].as_str())
                .unwrap_or_default()
                .to_string();
            Reply::Result(json!({"content": [{"type": "text", "text": text}]}))
        }
        "resources/read" => Reply::Result(json!({
            "contents": [{"uri": params.map(|p| p["uri"].clone()).unwrap_or_default(), "text": "# Readme"}]
        })),
        "prompts/get" => Reply::Result(json!({
            "messages": [{"role": "user", "content": {"type": "text", "text": "Hello there"}}]
        })),
        _ => Reply::Error(-32601, "Method not found"),
    }
}

/// Everything a test needs to drive one session against the scripted server
pub struct Harness {
    pub session: Session,
    pub server: ServerHandle,
    pub listener: MemoryListener,
}

pub async fn connect_with(config: SessionConfig, handler: Handler) -> Harness {
    let (factory, mut listener) = MemoryTransportFactory::new();
    let session = Session::new(config, Arc::new(factory));
    session.connect(TransportConfig::memory()).await.unwrap();
    let peer = listener.accept().await.unwrap();
    Harness {
        session,
        server: spawn_server(peer, handler),
        listener,
    }
}

pub async fn connect(handler: Handler) -> Harness {
    connect_with(SessionConfig::default(), handler).await
}

/// Accept the next connection on `listener` and serve it with `handler`
pub async fn accept(listener: &mut MemoryListener, handler: Handler) -> ServerHandle {
    let peer = tokio::time::timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("timed out waiting for connection")
        .expect("factory dropped");
    spawn_server(peer, handler)
}

pub async fn wait_for_state(session: &Session, state: SessionState) {
    let mut watcher = session.watch_state();
    tokio::time::timeout(Duration::from_secs(5), watcher.wait_for(|s| *s == state))
        .await
        .unwrap_or_else(|_| panic!("session never reached {state}, still {}", session.state()))
        .unwrap();
}

/// Poll `condition` until it holds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition never became true"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
