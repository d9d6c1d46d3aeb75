//! Counters for inbound traffic the session absorbed instead of surfacing.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct AtomicDiagnostics {
    pub(crate) requests_sent: AtomicU64,
    pub(crate) responses_matched: AtomicU64,
    pub(crate) unmatched_responses: AtomicU64,
    pub(crate) requests_timed_out: AtomicU64,
    pub(crate) malformed_messages: AtomicU64,
    pub(crate) server_requests_rejected: AtomicU64,
    pub(crate) notifications_received: AtomicU64,
    pub(crate) refresh_failures: AtomicU64,
}

impl AtomicDiagnostics {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SessionDiagnostics {
        SessionDiagnostics {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            responses_matched: self.responses_matched.load(Ordering::Relaxed),
            unmatched_responses: self.unmatched_responses.load(Ordering::Relaxed),
            requests_timed_out: self.requests_timed_out.load(Ordering::Relaxed),
            malformed_messages: self.malformed_messages.load(Ordering::Relaxed),
            server_requests_rejected: self.server_requests_rejected.load(Ordering::Relaxed),
            notifications_received: self.notifications_received.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of session counters, cumulative over the life of the [`Session`](crate::Session)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    /// Requests written to a channel
    pub requests_sent: u64,
    /// Responses delivered to a waiting caller
    pub responses_matched: u64,
    /// Responses whose id matched no outstanding request (including `null` ids)
    pub unmatched_responses: u64,
    /// Requests that failed with `RequestTimeout`
    pub requests_timed_out: u64,
    /// Inbound frames that were neither a response nor a notification
    pub malformed_messages: u64,
    /// Server-to-client requests answered with "method not found"
    pub server_requests_rejected: u64,
    /// Notifications received
    pub notifications_received: u64,
    /// Capability list refreshes that failed
    pub refresh_failures: u64,
}
