//! Per-connection traffic counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Point-in-time copy of a connection's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMetrics {
    /// Payload bytes handed to the wire.
    pub bytes_sent: u64,
    /// Payload bytes delivered to the event stream.
    pub bytes_received: u64,
    /// Frames sent.
    pub messages_sent: u64,
    /// Frames delivered to the event stream.
    pub messages_received: u64,
    /// Inbound frames discarded for exceeding the size limit.
    pub messages_dropped: u64,
    /// Smoothed time spent in `send`, in microseconds.
    pub send_latency_us: u64,
}

/// Lock-free counters shared by a connection's send path and reader task.
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    messages_dropped: AtomicU64,
    send_latency_us: AtomicU64,
}

impl AtomicMetrics {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// One frame of `size` bytes went out, taking `elapsed`.
    pub fn record_sent(&self, size: usize, elapsed: Duration) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(size as u64, Ordering::Relaxed);

        // Moving average with weight 1/8 for the newest sample.
        let sample = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let _ = self
            .send_latency_us
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |avg| {
                Some(if avg == 0 {
                    sample
                } else {
                    avg - avg / 8 + sample / 8
                })
            });
    }

    /// One frame of `size` bytes was delivered.
    pub fn record_received(&self, size: usize) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// One inbound frame was discarded.
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters out.
    pub fn snapshot(&self) -> TransportMetrics {
        TransportMetrics {
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            send_latency_us: self.send_latency_us.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames_and_bytes() {
        let metrics = AtomicMetrics::new();
        metrics.record_sent(100, Duration::from_micros(10));
        metrics.record_received(40);
        metrics.record_received(2);
        metrics.record_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.bytes_sent, 100);
        assert_eq!(snapshot.messages_sent, 1);
        assert_eq!(snapshot.bytes_received, 42);
        assert_eq!(snapshot.messages_received, 2);
        assert_eq!(snapshot.messages_dropped, 1);
        assert_eq!(snapshot.send_latency_us, 10);
    }

    #[test]
    fn latency_average_moves_toward_samples_without_overflow() {
        let metrics = AtomicMetrics::new();
        metrics.record_sent(1, Duration::from_micros(800));
        metrics.record_sent(1, Duration::from_micros(0));
        assert_eq!(metrics.snapshot().send_latency_us, 700);

        for _ in 0..100 {
            metrics.record_sent(1, Duration::MAX);
        }
        assert!(metrics.snapshot().send_latency_us > 0);
    }
}
