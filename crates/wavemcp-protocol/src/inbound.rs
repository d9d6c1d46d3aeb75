//! Classification of inbound frames.
//!
//! A client only ever receives two useful shapes from the server: responses to
//! its own requests and notifications. The rule is structural:
//!
//! * an object carrying an `id` key is a response (`"id": 0` and `"id": null`
//!   included),
//! * an object without an `id` key but with a `method` is a notification,
//! * everything else cannot be classified.
//!
//! Server-to-client requests (an `id` *and* a `method`) are not served by the
//! session layer. They are reported as [`ParseError::UnexpectedRequest`] with the
//! id intact, so the caller can answer them with a JSON-RPC error.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::jsonrpc::{JSONRPC_VERSION, JsonRpcNotification, JsonRpcResponse, RequestId};

/// A message received from the server
#[derive(Debug, Clone)]
pub enum InboundMessage {
    /// Response to a client request
    Response(JsonRpcResponse),
    /// Server-initiated notification
    Notification(JsonRpcNotification),
}

/// Why an inbound frame could not be turned into an [`InboundMessage`]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Payload is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Payload is valid JSON but not an object
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Missing or unsupported `jsonrpc` member
    #[error("Invalid JSON-RPC version: {0}")]
    InvalidVersion(String),

    /// The server sent a request, which this client does not serve
    #[error("Unsupported server request: {method} (id {id})")]
    UnexpectedRequest {
        /// Id the server expects a response for
        id: RequestId,
        /// Method the server asked for
        method: String,
    },

    /// Object carries neither an `id` nor a `method`
    #[error("Message is neither a response nor a notification")]
    Unclassifiable,

    /// Object was classified but its members have the wrong types
    #[error("Invalid message shape: {0}")]
    InvalidShape(String),
}

impl InboundMessage {
    /// Parse and classify a raw frame
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first problem found.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Classify an already-parsed JSON value
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the value is not a response or notification.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let object = match &value {
            Value::Object(object) => object,
            other => return Err(ParseError::NotAnObject(json_kind(other))),
        };

        check_version(object)?;

        let id = object.get("id");
        let method = object.get("method");

        match (id, method) {
            (Some(id), Some(method)) => Err(ParseError::UnexpectedRequest {
                id: serde_json::from_value(id.clone())
                    .map_err(|e| ParseError::InvalidShape(e.to_string()))?,
                method: method.as_str().unwrap_or_default().to_string(),
            }),
            (Some(_), None) => serde_json::from_value(value)
                .map(Self::Response)
                .map_err(|e| ParseError::InvalidShape(e.to_string())),
            (None, Some(_)) => serde_json::from_value(value)
                .map(Self::Notification)
                .map_err(|e| ParseError::InvalidShape(e.to_string())),
            (None, None) => Err(ParseError::Unclassifiable),
        }
    }

    /// Method name if this is a notification
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Notification(n) => Some(&n.method),
            Self::Response(_) => None,
        }
    }
}

fn check_version(object: &Map<String, Value>) -> Result<(), ParseError> {
    match object.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => Ok(()),
        Some(other) => Err(ParseError::InvalidVersion(other.to_string())),
        None => Err(ParseError::InvalidVersion("missing".to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<InboundMessage, ParseError> {
        InboundMessage::parse(raw.as_bytes())
    }

    #[test]
    fn id_zero_is_a_response() {
        let message = parse(r#"{"jsonrpc":"2.0","id":0,"result":{"ok":true}}"#).unwrap();
        match message {
            InboundMessage::Response(response) => {
                assert_eq!(response.request_id(), Some(&RequestId::Number(0)));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn null_id_is_a_response_without_request_id() {
        let message = parse(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#,
        )
        .unwrap();
        match message {
            InboundMessage::Response(response) => {
                assert_eq!(response.request_id(), None);
                assert_eq!(response.error().map(|e| e.code), Some(-32700));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn method_without_id_is_a_notification() {
        let message = parse(r#"{"jsonrpc":"2.0","method":"notifications/tools/list_changed"}"#)
            .unwrap();
        assert_eq!(message.method(), Some("notifications/tools/list_changed"));
    }

    #[test]
    fn id_and_method_is_an_unexpected_request() {
        let err = parse(r#"{"jsonrpc":"2.0","id":4,"method":"sampling/createMessage"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedRequest { ref id, ref method }
                if *id == RequestId::Number(4) && method == "sampling/createMessage"
        ));
    }

    #[test]
    fn rejects_unclassifiable_and_non_objects() {
        assert!(matches!(
            parse(r#"{"jsonrpc":"2.0"}"#),
            Err(ParseError::Unclassifiable)
        ));
        assert!(matches!(parse("[1,2]"), Err(ParseError::NotAnObject("array"))));
        assert!(matches!(parse("{nope"), Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn rejects_wrong_version() {
        assert!(matches!(
            parse(r#"{"jsonrpc":"1.0","id":1,"result":null}"#),
            Err(ParseError::InvalidVersion(_))
        ));
        assert!(matches!(
            parse(r#"{"id":1,"result":null}"#),
            Err(ParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn rejects_bad_member_types() {
        assert!(matches!(
            parse(r#"{"jsonrpc":"2.0","id":true,"result":1}"#),
            Err(ParseError::InvalidShape(_))
        ));
    }
}
