//! Transport event types.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// What a connection reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound payload (one text or binary frame).
    Message(Bytes),

    /// The connection ended cleanly. Terminal.
    Closed {
        /// An optional reason for the close, as reported by the peer.
        reason: Option<String>,
    },

    /// The connection failed. Terminal.
    Error {
        /// The error that ended the connection.
        error: TransportError,
    },
}

impl TransportEvent {
    /// Returns `true` for [`TransportEvent::Closed`] and [`TransportEvent::Error`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Message(_))
    }
}

/// Emitter used by transport implementations to publish [`TransportEvent`]s.
///
/// Once a terminal event has been emitted every further event is discarded, so
/// receivers see at most one `Closed` or `Error` per connection.
#[derive(Debug, Clone)]
pub struct TransportEventEmitter {
    sender: mpsc::UnboundedSender<TransportEvent>,
    terminated: Arc<AtomicBool>,
}

impl TransportEventEmitter {
    /// Creates a new event emitter and a corresponding receiver.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                terminated: Arc::new(AtomicBool::new(false)),
            },
            receiver,
        )
    }

    /// Emits an event. Returns `false` if it was discarded.
    pub fn emit(&self, event: TransportEvent) -> bool {
        if event.is_terminal() {
            if self.terminated.swap(true, Ordering::AcqRel) {
                return false;
            }
        } else if self.terminated.load(Ordering::Acquire) {
            return false;
        }
        // Receiver gone means the owner stopped listening.
        self.sender.send(event).is_ok()
    }

    /// Emits a `Message` event.
    pub fn emit_message(&self, payload: Bytes) -> bool {
        self.emit(TransportEvent::Message(payload))
    }

    /// Emits a `Closed` event.
    pub fn emit_closed(&self, reason: Option<String>) -> bool {
        self.emit(TransportEvent::Closed { reason })
    }

    /// Emits an `Error` event.
    pub fn emit_error(&self, error: TransportError) -> bool {
        self.emit(TransportEvent::Error { error })
    }

    /// Whether a terminal event has already been emitted.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}
