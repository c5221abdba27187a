use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Relay-wide counters shared by both transports.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    // Stream transport
    pub connections_opened: AtomicU64,
    pub connections_closed: AtomicU64,
    pub frames_received: AtomicU64,
    pub envelope_encode_failures: AtomicU64,

    // Fan-out
    pub deliveries: AtomicU64,
    pub drops: AtomicU64,

    // Datagram transport
    pub datagrams_received: AtomicU64,
    pub datagrams_forwarded: AtomicU64,
    pub datagram_forward_failures: AtomicU64,
    pub datagrams_injected: AtomicU64,
}

/// Point-in-time copy of [`RelayMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_closed: u64,
    pub active_connections: u64,
    pub frames_received: u64,
    pub envelope_encode_failures: u64,
    pub deliveries: u64,
    pub drops: u64,
    pub datagrams_received: u64,
    pub datagrams_forwarded: u64,
    pub datagram_forward_failures: u64,
    pub datagrams_injected: u64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_connections(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_disconnections(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_frames_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_encode_failures(&self) {
        self.envelope_encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one fan-out.
    pub fn record_fanout(&self, delivered: usize, dropped: usize) {
        self.deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.drops.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    pub fn increment_datagrams_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_datagram_forwards(&self, forwarded: usize, failed: usize) {
        self.datagrams_forwarded
            .fetch_add(forwarded as u64, Ordering::Relaxed);
        self.datagram_forward_failures
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn increment_datagrams_injected(&self) {
        self.datagrams_injected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            active_connections: opened.saturating_sub(closed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            envelope_encode_failures: self.envelope_encode_failures.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            datagrams_forwarded: self.datagrams_forwarded.load(Ordering::Relaxed),
            datagram_forward_failures: self.datagram_forward_failures.load(Ordering::Relaxed),
            datagrams_injected: self.datagrams_injected.load(Ordering::Relaxed),
        }
    }
}
