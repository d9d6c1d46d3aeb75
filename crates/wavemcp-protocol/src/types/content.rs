//! Content blocks carried by tool results and prompt messages.

use serde::{Deserialize, Serialize};

use super::resources::ResourceContents;

/// One block of a tool result or prompt message, tagged by `type`.
///
/// A tag this client does not model becomes [`ContentBlock::Unknown`] instead
/// of failing the whole result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// `"text"`
    Text(TextContent),
    /// `"image"`
    Image(BinaryContent),
    /// `"audio"`
    Audio(BinaryContent),
    /// `"resource_link"`
    ResourceLink(ResourceLink),
    /// `"resource"`
    Resource(EmbeddedResource),
    /// Anything else
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Text of a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

/// Body of a text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// UTF-8 text
    pub text: String,
}

/// Body of an image or audio block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryContent {
    /// Base64 payload
    pub data: String,
    /// e.g. `image/png`
    pub mime_type: String,
}

/// Pointer to a resource that can be fetched with `resources/read`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLink {
    /// Target URI
    pub uri: String,
    /// Short name
    pub name: String,
    /// Longer explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media type of the target, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Resource contents inlined into a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedResource {
    /// The inlined contents
    pub resource: ResourceContents,
}
