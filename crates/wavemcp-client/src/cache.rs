//! Capability cache: the last tool, resource and prompt lists received from the server.
//!
//! Each list is held in a `watch` channel, so readers always see the most recent
//! complete list and subscribers are woken on every replacement. Lists are never
//! patched in place; a refresh swaps in a new `Arc<Vec<_>>`.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use wavemcp_protocol::methods;
use wavemcp_protocol::types::{Prompt, Resource, Tool};

/// Which cached list an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// `tools/list`
    Tools,
    /// `resources/list`
    Resources,
    /// `prompts/list`
    Prompts,
}

impl ListKind {
    /// Request method that fetches this list
    pub fn list_method(self) -> &'static str {
        match self {
            Self::Tools => methods::TOOLS_LIST,
            Self::Resources => methods::RESOURCES_LIST,
            Self::Prompts => methods::PROMPTS_LIST,
        }
    }

    /// Map a `list_changed` notification method to the list it invalidates
    pub fn from_list_changed(method: &str) -> Option<Self> {
        match method {
            methods::TOOLS_LIST_CHANGED => Some(Self::Tools),
            methods::RESOURCES_LIST_CHANGED => Some(Self::Resources),
            methods::PROMPTS_LIST_CHANGED => Some(Self::Prompts),
            _ => None,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tools => "tools",
            Self::Resources => "resources",
            Self::Prompts => "prompts",
        })
    }
}

/// Shared, immutable snapshot of one list
pub type Snapshot<T> = Arc<Vec<T>>;

#[derive(Debug)]
pub(crate) struct CapabilityCache {
    tools: watch::Sender<Snapshot<Tool>>,
    resources: watch::Sender<Snapshot<Resource>>,
    prompts: watch::Sender<Snapshot<Prompt>>,
}

impl Default for CapabilityCache {
    fn default() -> Self {
        Self {
            tools: watch::channel(Snapshot::default()).0,
            resources: watch::channel(Snapshot::default()).0,
            prompts: watch::channel(Snapshot::default()).0,
        }
    }
}

impl CapabilityCache {
    pub(crate) fn tools(&self) -> Snapshot<Tool> {
        Arc::clone(&self.tools.borrow())
    }

    pub(crate) fn resources(&self) -> Snapshot<Resource> {
        Arc::clone(&self.resources.borrow())
    }

    pub(crate) fn prompts(&self) -> Snapshot<Prompt> {
        Arc::clone(&self.prompts.borrow())
    }

    pub(crate) fn watch_tools(&self) -> watch::Receiver<Snapshot<Tool>> {
        self.tools.subscribe()
    }

    pub(crate) fn watch_resources(&self) -> watch::Receiver<Snapshot<Resource>> {
        self.resources.subscribe()
    }

    pub(crate) fn watch_prompts(&self) -> watch::Receiver<Snapshot<Prompt>> {
        self.prompts.subscribe()
    }

    pub(crate) fn replace_tools(&self, tools: Vec<Tool>) -> Snapshot<Tool> {
        let snapshot = Arc::new(tools);
        self.tools.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub(crate) fn replace_resources(&self, resources: Vec<Resource>) -> Snapshot<Resource> {
        let snapshot = Arc::new(resources);
        self.resources.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    pub(crate) fn replace_prompts(&self, prompts: Vec<Prompt>) -> Snapshot<Prompt> {
        let snapshot = Arc::new(prompts);
        self.prompts.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    /// Empty all three lists. Subscribers are only woken for lists that were non-empty.
    pub(crate) fn clear(&self) {
        self.tools.send_if_modified(clear_list);
        self.resources.send_if_modified(clear_list);
        self.prompts.send_if_modified(clear_list);
    }
}

fn clear_list<T>(list: &mut Snapshot<T>) -> bool {
    if list.is_empty() {
        return false;
    }
    *list = Arc::new(Vec::new());
    true
}
