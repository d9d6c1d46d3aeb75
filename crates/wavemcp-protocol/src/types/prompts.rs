//! `prompts/list` and `prompts/get`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{content::ContentBlock, core::Role};

/// Prompt template entry from `prompts/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Key passed to `prompts/get`
    pub name: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// What the template produces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Template parameters; absent and empty are treated alike
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptArgument>>,
}

impl Prompt {
    /// Declared parameters, empty when the server sent none
    pub fn argument_list(&self) -> &[PromptArgument] {
        self.arguments.as_deref().unwrap_or_default()
    }
}

/// One template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Key in the `arguments` object
    pub name: String,
    /// What to pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Missing means optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Page of `prompts/list`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsResult {
    /// Entries on this page
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    /// Present when more pages exist; this client reads only the first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Params of `prompts/get`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptRequest {
    /// Template to render
    pub name: String,
    /// Values for the template parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// A rendered prompt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GetPromptResult {
    /// Summary of the rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Conversation produced by the template
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
}

/// One turn of a rendered prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who says it
    pub role: Role,
    /// What is said
    pub content: ContentBlock,
}
