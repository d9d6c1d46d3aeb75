//! What each side declares it can do during `initialize`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client side of the negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientCapabilities {
    /// Non-standard extensions, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Map<String, Value>>,
    /// Set when the client can answer `roots/list`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<ListChanged>,
    /// Set when the client can serve `sampling/createMessage`; always `{}` on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Map<String, Value>>,
}

impl ClientCapabilities {
    /// `{"roots": {"listChanged": true}, "sampling": {}}`, announced unless a
    /// session is configured with something else.
    pub fn session_default() -> Self {
        Self {
            experimental: None,
            roots: Some(ListChanged::notifying()),
            sampling: Some(Map::new()),
        }
    }
}

/// Server side of the negotiation. Members this client does not model are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Non-standard extensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Map<String, Value>>,
    /// Set when the server emits `notifications/message`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Value>,
    /// Set when the server has prompt templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChanged>,
    /// Set when the server has resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapabilities>,
    /// Set when the server has tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChanged>,
}

impl ServerCapabilities {
    /// Names of the feature groups the server declared, in a fixed order.
    pub fn offered(&self) -> Vec<&'static str> {
        [
            self.tools.as_ref().map(|_| "tools"),
            self.resources.as_ref().map(|_| "resources"),
            self.prompts.as_ref().map(|_| "prompts"),
            self.logging.as_ref().map(|_| "logging"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A capability whose only option is change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
    /// Whether the declaring side sends `*/list_changed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

impl ListChanged {
    /// `{"listChanged": true}`
    pub const fn notifying() -> Self {
        Self {
            list_changed: Some(true),
        }
    }
}

/// Resource support; adds per-URI subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapabilities {
    /// Whether `resources/subscribe` is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether the server sends `notifications/resources/list_changed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}
