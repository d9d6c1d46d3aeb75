//! Wire-format checks against payloads shaped like real MCP server traffic.

use pretty_assertions::assert_eq;
use serde_json::json;
use wavemcp_protocol::types::{
    CallToolRequest, ClientCapabilities, ContentBlock, GetPromptResult, Implementation,
    InitializeRequest, InitializeResult, ListPromptsResult, ListResourcesResult,
    ListToolsResult, ReadResourceResult, Role,
};
use wavemcp_protocol::{InboundMessage, JsonRpcRequest, PROTOCOL_VERSION, RequestId, methods};

#[test]
fn initialize_request_matches_handshake_shape() {
    let params = InitializeRequest {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ClientCapabilities::session_default(),
        client_info: Implementation::new("wavemcp", "1.0.0"),
    };
    let request = JsonRpcRequest::with_params(RequestId::Number(1), methods::INITIALIZE, params)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {"roots": {"listChanged": true}, "sampling": {}},
                "clientInfo": {"name": "wavemcp", "version": "1.0.0"}
            }
        })
    );
}

#[test]
fn initialize_result_from_minimal_server() {
    let result: InitializeResult = serde_json::from_value(json!({
        "protocolVersion": "2024-11-05",
        "serverInfo": {"name": "demo", "version": "1.0"}
    }))
    .unwrap();

    assert_eq!(result.server_info, Implementation::new("demo", "1.0"));
    assert!(result.capabilities.tools.is_none());
    assert!(result.instructions.is_none());
}

#[test]
fn list_results_parse_descriptors() {
    let tools: ListToolsResult = serde_json::from_value(json!({
        "tools": [{"name": "echo", "inputSchema": {"type": "object"}}]
    }))
    .unwrap();
    assert_eq!(tools.tools[0].name, "echo");
    assert_eq!(tools.tools[0].input_schema, json!({"type": "object"}));

    let resources: ListResourcesResult = serde_json::from_value(json!({
        "resources": [{"uri": "file:///a.txt", "name": "a", "mimeType": "text/plain"}]
    }))
    .unwrap();
    assert_eq!(
        resources.resources[0].mime_type.as_deref(),
        Some("text/plain")
    );

    let prompts: ListPromptsResult = serde_json::from_value(json!({
        "prompts": [{
            "name": "greet",
            "arguments": [{"name": "who", "required": true}]
        }]
    }))
    .unwrap();
    let arguments = prompts.prompts[0].arguments.as_ref().unwrap();
    assert_eq!(arguments[0].required, Some(true));
}

#[test]
fn read_resource_and_get_prompt_results() {
    let read: ReadResourceResult = serde_json::from_value(json!({
        "contents": [{"uri": "file:///a.txt", "text": "hello"}]
    }))
    .unwrap();
    assert_eq!(read.contents[0].text.as_deref(), Some("hello"));
    assert!(read.contents[0].blob.is_none());

    let prompt: GetPromptResult = serde_json::from_value(json!({
        "messages": [{"role": "user", "content": {"type": "text", "text": "hi"}}]
    }))
    .unwrap();
    assert_eq!(prompt.messages[0].role, Role::User);
    assert_eq!(prompt.messages[0].content.as_text(), Some("hi"));
}

#[test]
fn call_tool_arguments_are_omitted_when_absent() {
    let params = CallToolRequest {
        name: "ping".to_string(),
        arguments: None,
    };
    assert_eq!(serde_json::to_value(params).unwrap(), json!({"name": "ping"}));
}

#[test]
fn embedded_resource_content_block() {
    let block: ContentBlock = serde_json::from_value(json!({
        "type": "resource",
        "resource": {"uri": "mem://x", "blob": "AAAA", "mimeType": "application/octet-stream"}
    }))
    .unwrap();
    match block {
        ContentBlock::Resource(embedded) => assert_eq!(embedded.resource.blob.as_deref(), Some("AAAA")),
        other => panic!("unexpected block {other:?}"),
    }
}

#[test]
fn notification_params_survive_classification() {
    let message = InboundMessage::parse(
        br#"{"jsonrpc":"2.0","method":"notifications/message","params":{"level":"info"}}"#,
    )
    .unwrap();
    match message {
        InboundMessage::Notification(notification) => {
            assert_eq!(notification.params, Some(json!({"level": "info"})));
        }
        InboundMessage::Response(_) => panic!("expected notification"),
    }
}

#[test]
fn sparse_initialize_result_is_accepted() {
    let result: InitializeResult = serde_json::from_value(json!({
        "serverInfo": {"name": "bare"}
    }))
    .unwrap();
    assert_eq!(result.protocol_version, "");
    assert_eq!(result.server_info.version, "");
    assert_eq!(result.server_info.to_string(), "bare");
    assert!(result.capabilities.offered().is_empty());
}

#[test]
fn unmodelled_prompt_roles_still_parse() {
    let prompt: GetPromptResult = serde_json::from_value(json!({
        "messages": [
            {"role": "system", "content": {"type": "text", "text": "be brief"}},
            {"role": "assistant", "content": {"type": "text", "text": "ok"}}
        ]
    }))
    .unwrap();
    assert_eq!(prompt.messages[0].role, Role::Other);
    assert_eq!(prompt.messages[0].content.as_text(), Some("be brief"));
    assert_eq!(prompt.messages[1].role, Role::Assistant);
}
