//! Frame size limits.

use serde::{Deserialize, Serialize};
use wavemcp_protocol::MAX_MESSAGE_SIZE;

use crate::error::{TransportError, TransportResult};

/// Largest frame accepted in each direction; `None` disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Cap on frames handed to `send`
    pub max_outbound: Option<usize>,
    /// Cap on frames read from the peer
    pub max_inbound: Option<usize>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_outbound: Some(MAX_MESSAGE_SIZE),
            max_inbound: Some(MAX_MESSAGE_SIZE),
        }
    }
}

impl LimitsConfig {
    /// No cap in either direction.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_outbound: None,
            max_inbound: None,
        }
    }

    /// Reject an outgoing frame of `size` bytes if it is over the cap.
    pub fn check_outbound(&self, size: usize) -> TransportResult<()> {
        match self.max_outbound {
            Some(max) if size > max => Err(TransportError::OutboundTooLarge { size, max }),
            _ => Ok(()),
        }
    }

    /// Reject an incoming frame of `size` bytes if it is over the cap.
    pub fn check_inbound(&self, size: usize) -> TransportResult<()> {
        match self.max_inbound {
            Some(max) if size > max => Err(TransportError::InboundTooLarge { size, max }),
            _ => Ok(()),
        }
    }
}
