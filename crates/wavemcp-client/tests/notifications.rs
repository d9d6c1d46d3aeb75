//! Notification routing and capability-cache refresh.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{Reply, connect, demo_reply, eventually, handler};
use pretty_assertions::assert_eq;
use serde_json::json;
use wavemcp_client::{SessionError, SessionState};

#[tokio::test]
async fn tools_list_changed_refreshes_the_cache() {
    let second_tool = Arc::new(AtomicBool::new(false));
    let harness = connect(handler({
        let second_tool = Arc::clone(&second_tool);
        move |method, params| match method {
            "tools/list" if second_tool.load(Ordering::SeqCst) => Reply::Result(json!({
                "tools": [
                    {"name": "echo", "inputSchema": {"type": "object"}},
                    {"name": "reverse", "description": "Reverse a string", "inputSchema": {"type": "object"}}
                ]
            })),
            _ => demo_reply(method, params),
        }
    }))
    .await;
    let session = &harness.session;
    session.initialize().await.unwrap();
    assert_eq!(session.tools().len(), 1);

    let mut tools = session.watch_tools();
    tools.borrow_and_update();
    second_tool.store(true, Ordering::SeqCst);
    harness
        .server
        .notify("notifications/tools/list_changed", None);

    tokio::time::timeout(Duration::from_secs(5), tools.changed())
        .await
        .unwrap()
        .unwrap();
    let names: Vec<String> = tools
        .borrow_and_update()
        .iter()
        .map(|tool| tool.name.clone())
        .collect();
    assert_eq!(names, vec!["echo".to_string(), "reverse".to_string()]);
    assert_eq!(session.state(), SessionState::Initialized);
}

#[tokio::test]
async fn every_notification_is_republished() {
    let harness = connect(common::demo_server()).await;
    let mut notifications = harness.session.subscribe_notifications();

    harness.server.notify(
        "notifications/message",
        Some(json!({"level": "info", "data": "indexing finished"})),
    );
    harness
        .server
        .notify("notifications/prompts/list_changed", None);

    let first = tokio::time::timeout(Duration::from_secs(5), notifications.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.method, "notifications/message");
    assert_eq!(
        first.params,
        Some(json!({"level": "info", "data": "indexing finished"}))
    );

    let second = notifications.recv().await.unwrap();
    assert_eq!(second.method, "notifications/prompts/list_changed");

    eventually(|| harness.session.diagnostics().notifications_received == 2).await;
    // The list_changed also triggered a refresh, even without a handshake.
    eventually(|| harness.session.prompts().len() == 1).await;
}

#[tokio::test]
async fn failed_refresh_after_notification_is_swallowed() {
    let harness = connect(handler(|method, params| match method {
        "resources/list" => Reply::Error(-32603, "Internal error"),
        _ => demo_reply(method, params),
    }))
    .await;
    let session = &harness.session;
    session.initialize().await.unwrap();
    assert_eq!(session.diagnostics().refresh_failures, 1);

    harness
        .server
        .notify("notifications/resources/list_changed", None);
    eventually(|| session.diagnostics().refresh_failures == 2).await;

    assert_eq!(session.state(), SessionState::Initialized);
    assert!(session.resources().is_empty());
    assert_eq!(session.tools().len(), 1);
}

#[tokio::test]
async fn refresh_cut_off_by_disconnect_leaves_lists_empty() {
    let mut harness = connect(handler(|method, params| match method {
        "tools/list" => Reply::Silent,
        _ => demo_reply(method, params),
    }))
    .await;
    let session = harness.session.clone();

    let refresh = tokio::spawn({
        let session = session.clone();
        async move { session.refresh_tools().await }
    });
    let request = harness.server.wait_for("tools/list").await;

    session.disconnect().await;
    // Too late: the connection it was issued on is gone.
    harness.server.send(json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "result": {"tools": [{"name": "ghost", "inputSchema": {}}]}
    }));

    assert!(matches!(
        refresh.await.unwrap(),
        Err(SessionError::Disconnected)
    ));
    assert!(session.tools().is_empty());
}

#[tokio::test]
async fn missing_list_field_means_empty_list() {
    let harness = connect(handler(|method, params| match method {
        "prompts/list" => Reply::Result(json!({})),
        _ => demo_reply(method, params),
    }))
    .await;

    let prompts = harness.session.refresh_prompts().await.unwrap();
    assert!(prompts.is_empty());
}
