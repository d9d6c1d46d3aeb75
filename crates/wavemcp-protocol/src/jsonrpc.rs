//! JSON-RPC 2.0 envelopes.
//!
//! Requests and notifications go out; responses and notifications come in.
//! Server-to-client requests are classified in [`crate::inbound`] but have no
//! envelope type here, since the session only ever rejects them.

use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// The only protocol revision accepted in the `jsonrpc` member
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard error codes
pub mod codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist or is not available
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Marker for the `"jsonrpc": "2.0"` member; any other value fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
        if raw == JSONRPC_VERSION {
            Ok(Self)
        } else {
            Err(de::Error::invalid_value(
                Unexpected::Str(&raw),
                &"the string \"2.0\"",
            ))
        }
    }
}

/// Request identifier.
///
/// The session only allocates numbers, but a server may use strings for its
/// own requests, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier (`0` is valid)
    Number(i64),
    /// String identifier
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self::String(id.to_owned())
    }
}

/// Outgoing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`
    pub jsonrpc: JsonRpcVersion,
    /// Correlation id
    pub id: RequestId,
    /// Method name
    pub method: String,
    /// Parameters; omitted from the wire when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request from already-encoded parameters
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id,
            method: method.into(),
            params,
        }
    }

    /// Build a request, encoding `params` to JSON first
    pub fn with_params<P: Serialize>(
        id: RequestId,
        method: impl Into<String>,
        params: P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, method, Some(serde_json::to_value(params)?)))
    }
}

/// Response to a request.
///
/// `id` is `None` when the peer answered with `"id": null`, which it does for
/// errors it could not tie to a request. An `error` member makes the response
/// a failure whatever `result` holds; with neither member it resolves to `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`
    pub jsonrpc: JsonRpcVersion,
    /// Id of the request being answered
    pub id: Option<RequestId>,
    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A successful response to `id`
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// A failed response to `id`
    pub fn failure(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id: Some(id),
            result: None,
            error: Some(error),
        }
    }

    /// Id of the request being answered, unless it was `null`
    pub fn request_id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// The error member, if any
    pub fn error(&self) -> Option<&JsonRpcError> {
        self.error.as_ref()
    }

    /// Consume the response, yielding the result payload or the server error.
    pub fn into_outcome(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// One-way message; never answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`
    pub jsonrpc: JsonRpcVersion,
    /// Notification name
    pub method: String,
    /// Parameters, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Build a notification
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
        }
    }

    /// Build a notification that carries no `params` member
    pub fn without_params(method: impl Into<String>) -> Self {
        Self::new(method, None)
    }
}

/// Error object of a failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    /// Numeric code; see [`codes`]
    pub code: i32,
    /// Short description
    pub message: String,
    /// Extra server-defined detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Error with no `data`
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The reply to a request for a method this side does not implement
    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Whether the code is one of the reserved JSON-RPC codes
    pub fn is_standard(&self) -> bool {
        matches!(
            self.code,
            codes::PARSE_ERROR
                | codes::INVALID_REQUEST
                | codes::METHOD_NOT_FOUND
                | codes::INVALID_PARAMS
                | codes::INTERNAL_ERROR
        )
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MCP Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}
