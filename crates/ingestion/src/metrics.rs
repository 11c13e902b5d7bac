//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one ingestion path.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Dispatches produced by the source.
    received: AtomicU64,
    /// Dispatches injected into a captor.
    forwarded: AtomicU64,
    /// Dispatches dropped because the stream channel was full.
    dropped: AtomicU64,
}

impl IngestMetrics {
    /// New zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one produced dispatch.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one injected dispatch.
    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one dispatch lost to a full channel.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total produced dispatches.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Total injected dispatches.
    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    /// Total dropped dispatches.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Snapshot of all counters.
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            received: self.received(),
            forwarded: self.forwarded(),
            dropped: self.dropped(),
        }
    }
}

/// Point-in-time copy of [`IngestMetrics`] counters.
#[derive(Debug, Clone, Copy)]
pub struct IngestSnapshot {
    pub received: u64,
    pub forwarded: u64,
    pub dropped: u64,
}
