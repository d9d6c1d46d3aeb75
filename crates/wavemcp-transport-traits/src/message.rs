//! Transport message types.

use bytes::Bytes;
use wavemcp_protocol::RequestId;

/// An outbound message handed to a transport.
#[derive(Debug, Clone)]
pub struct TransportMessage {
    /// Id of the JSON-RPC request carried in the payload, if any. Used for logging only.
    pub id: Option<RequestId>,

    /// The serialized JSON payload.
    pub payload: Bytes,
}

impl TransportMessage {
    /// Creates a message carrying a request.
    pub fn new(id: RequestId, payload: Bytes) -> Self {
        Self {
            id: Some(id),
            payload,
        }
    }

    /// Creates a message with no request id attached (notifications, replies to the server).
    pub fn without_id(payload: Bytes) -> Self {
        Self { id: None, payload }
    }

    /// Returns the size of the message payload in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
