//! MCP data types used by the client session.
//!
//! - [`core`] - Implementation info and roles
//! - [`capabilities`] - Client/server capability negotiation
//! - [`initialization`] - Connection handshake types
//! - [`content`] - Content blocks returned by tools and prompts
//! - [`tools`] - Tool discovery and invocation
//! - [`resources`] - Resource discovery and reads
//! - [`prompts`] - Prompt discovery and retrieval

pub mod capabilities;
pub mod content;
pub mod core;
pub mod initialization;
pub mod prompts;
pub mod resources;
pub mod tools;

pub use capabilities::*;
pub use content::*;
pub use core::*;
pub use initialization::*;
pub use prompts::*;
pub use resources::*;
pub use tools::*;
