//! Request/response correlation.
//!
//! The correlator owns the table of requests awaiting a response. It is a plain
//! data structure: the session keeps it behind its state mutex, registers an
//! entry before a request is written to the channel and resolves entries from
//! the reader task as responses arrive. Waiters hold the receiving half of a
//! `oneshot`, so each entry completes exactly once.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;
use wavemcp_protocol::{JsonRpcError, RequestId};

use crate::error::{SessionError, SessionResult};

/// First id handed out on a fresh connection
const FIRST_ID: i64 = 1;

/// One request awaiting its response
#[derive(Debug)]
struct PendingRequest {
    method: String,
    deadline: Instant,
    completion: oneshot::Sender<SessionResult<Value>>,
}

/// Handle returned by [`Correlator::register`]
#[derive(Debug)]
pub(crate) struct Ticket {
    pub(crate) id: RequestId,
    pub(crate) deadline: Instant,
    pub(crate) response: oneshot::Receiver<SessionResult<Value>>,
}

/// Table of outstanding requests plus the id counter of one connection
#[derive(Debug)]
pub(crate) struct Correlator {
    next_id: i64,
    pending: HashMap<RequestId, PendingRequest>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::starting_at(FIRST_ID)
    }
}

impl Correlator {
    pub(crate) fn starting_at(next_id: i64) -> Self {
        Self {
            next_id,
            pending: HashMap::new(),
        }
    }

    /// Allocate an id and register a waiter for it
    pub(crate) fn register(&mut self, method: &str, deadline: Instant) -> Ticket {
        let id = self.allocate_id();
        let (completion, response) = oneshot::channel();
        self.pending.insert(
            id.clone(),
            PendingRequest {
                method: method.to_string(),
                deadline,
                completion,
            },
        );
        Ticket {
            id,
            deadline,
            response,
        }
    }

    /// Deliver a response outcome to its waiter.
    ///
    /// Returns `false` when no request with this id is outstanding.
    pub(crate) fn resolve(&mut self, id: &RequestId, outcome: Result<Value, JsonRpcError>) -> bool {
        let Some(entry) = self.pending.remove(id) else {
            return false;
        };
        // The waiter may have given up already; the entry is gone either way.
        let _ = entry.completion.send(outcome.map_err(SessionError::from));
        true
    }

    /// Drop an entry whose send failed. Returns the method it was registered for.
    pub(crate) fn cancel(&mut self, id: &RequestId) -> Option<String> {
        self.pending.remove(id).map(|entry| entry.method)
    }

    /// Drop an entry whose deadline has passed. Returns the method it was registered for.
    pub(crate) fn expire(&mut self, id: &RequestId, now: Instant) -> Option<String> {
        match self.pending.get(id) {
            Some(entry) if entry.deadline <= now => self.cancel(id),
            _ => None,
        }
    }

    /// Reject every outstanding request with `Disconnected` and restart the id counter.
    ///
    /// Returns the number of requests rejected.
    pub(crate) fn reset(&mut self) -> usize {
        let rejected = self.pending.len();
        for (_, entry) in self.pending.drain() {
            let _ = entry.completion.send(Err(SessionError::Disconnected));
        }
        self.next_id = FIRST_ID;
        rejected
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Next id in sequence, wrapping to 0 after `i64::MAX` and skipping ids still in flight
    fn allocate_id(&mut self) -> RequestId {
        loop {
            let candidate = RequestId::Number(self.next_id);
            self.next_id = self.next_id.checked_add(1).unwrap_or(0);
            if !self.pending.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}
