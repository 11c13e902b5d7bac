//! Capture metrics collection
//!
//! Recording helpers around the `metrics` facade plus an in-memory
//! aggregator for summaries in tests and demos.

use capture_engine::GroupCapture;
use contracts::CaptureState;
use metrics::{counter, gauge, histogram};

/// Record the outcome of one group capture attempt.
///
/// Call after every `Synchronizer::capture`-family call.
pub fn record_group_capture<S>(result: &GroupCapture<S>, frame_id: u64) {
    counter!(
        "captor_sync_group_attempts_total",
        "state" => result.state.as_str()
    )
    .increment(1);

    if result.is_primed() {
        gauge!("captor_sync_last_frame_id").set(frame_id as f64);
    }

    if result.state == CaptureState::Abort {
        counter!("captor_sync_group_aborts_total").increment(1);
    }
}

/// Record one dispatch arriving at a captor.
pub fn record_dispatch_injected(stream: &str) {
    counter!(
        "captor_sync_dispatches_injected_total",
        "stream" => stream.to_string()
    )
    .increment(1);
}

/// Record a captor's queue depth.
pub fn record_queue_depth(stream: &str, depth: usize) {
    gauge!(
        "captor_sync_queue_depth",
        "stream" => stream.to_string()
    )
    .set(depth as f64);
    histogram!(
        "captor_sync_queue_depth_hist",
        "stream" => stream.to_string()
    )
    .record(depth as f64);
}

/// In-memory aggregation of capture outcomes.
///
/// Useful where no metrics recorder is installed, e.g. summarizing a test
/// run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureMetricsAggregator {
    frames: u64,
    retries: u64,
    aborts: u64,
    timeouts: u64,
}

impl CaptureMetricsAggregator {
    /// New zeroed aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one group capture outcome in.
    pub fn record<S>(&mut self, result: &GroupCapture<S>) {
        match result.state {
            CaptureState::Primed => self.frames += 1,
            CaptureState::Retry => self.retries += 1,
            CaptureState::Abort => self.aborts += 1,
            CaptureState::Timeout => self.timeouts += 1,
        }
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Snapshot of all counters.
    pub fn summary(&self) -> CaptureSummary {
        CaptureSummary {
            frames: self.frames,
            retries: self.retries,
            aborts: self.aborts,
            timeouts: self.timeouts,
        }
    }
}

/// Point-in-time summary of capture outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSummary {
    pub frames: u64,
    pub retries: u64,
    pub aborts: u64,
    pub timeouts: u64,
}
