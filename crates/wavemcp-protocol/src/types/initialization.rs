//! `initialize` parameters and result.

use serde::{Deserialize, Serialize};

use super::capabilities::{ClientCapabilities, ServerCapabilities};
use super::core::Implementation;

/// Params of the first request on every connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    /// Revision the client speaks
    pub protocol_version: String,
    /// What the client supports
    pub capabilities: ClientCapabilities,
    /// Who the client is
    pub client_info: Implementation,
}

/// What the server answers to `initialize`.
///
/// The session keeps the whole value; see `ServerDetails` in the client crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Revision the server settled on; not checked against the offer.
    /// Empty when the server left it out.
    #[serde(default)]
    pub protocol_version: String,
    /// Declared feature groups; missing means none
    #[serde(default)]
    pub capabilities: ServerCapabilities,
    /// Who the server is
    pub server_info: Implementation,
    /// Usage hints meant for a model or a human
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}
