//! Identity and role types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name and version of a client or server program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Machine name, e.g. `wavemcp`
    pub name: String,
    /// Name for display, if different
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free-form version string; empty if the peer sent none
    #[serde(default)]
    pub version: String,
}

impl Implementation {
    /// Identity with no display title
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, self.version)
        }
    }
}

/// Speaker of a prompt message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `"user"`
    User,
    /// `"assistant"`
    Assistant,
    /// Any role this client does not model
    #[serde(other)]
    Other,
}
