//! MCP method names used by the client session.

/// Handshake request
pub const INITIALIZE: &str = "initialize";
/// Sent by the client once the handshake response has been processed
pub const INITIALIZED: &str = "notifications/initialized";

/// List tools
pub const TOOLS_LIST: &str = "tools/list";
/// Invoke a tool
pub const TOOLS_CALL: &str = "tools/call";
/// List resources
pub const RESOURCES_LIST: &str = "resources/list";
/// Read one resource
pub const RESOURCES_READ: &str = "resources/read";
/// List prompts
pub const PROMPTS_LIST: &str = "prompts/list";
/// Fetch a rendered prompt
pub const PROMPTS_GET: &str = "prompts/get";

/// Server notification: the tool list changed
pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";
/// Server notification: the resource list changed
pub const RESOURCES_LIST_CHANGED: &str = "notifications/resources/list_changed";
/// Server notification: the prompt list changed
pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";
