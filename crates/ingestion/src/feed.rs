//! CaptorFeed - bridge a dispatch channel into a blocking captor
//!
//! A worker thread drains the receiver and injects into the shared captor,
//! so producers stay decoupled from capture pacing.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use async_channel::Receiver;
use capture_engine::{BlockingCaptor, CapturePolicy};
use contracts::StreamId;
use tracing::{debug, instrument};

use crate::metrics::IngestMetrics;

/// Handle to a running feed worker.
pub struct CaptorFeed {
    stream: StreamId,
    metrics: Arc<IngestMetrics>,
    worker: JoinHandle<()>,
}

impl CaptorFeed {
    /// Spawn a worker draining `rx` into `captor`.
    ///
    /// The worker exits when the channel closes (source stopped or all
    /// senders dropped).
    pub fn spawn<P>(
        stream: impl Into<StreamId>,
        rx: Receiver<P::Dispatch>,
        captor: Arc<BlockingCaptor<P>>,
    ) -> Self
    where
        P: CapturePolicy + Send + 'static,
        P::Dispatch: Send + 'static,
    {
        let stream = stream.into();
        let metrics = Arc::new(IngestMetrics::new());

        let worker_stream = stream.clone();
        let worker_metrics = Arc::clone(&metrics);
        let worker = thread::spawn(move || {
            feed_worker(worker_stream, rx, captor, worker_metrics);
        });

        Self {
            stream,
            metrics,
            worker,
        }
    }

    /// Stream label.
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }

    /// Ingestion counters for this feed.
    pub fn metrics(&self) -> &Arc<IngestMetrics> {
        &self.metrics
    }

    /// Wait for the worker to drain and exit.
    pub fn join(self) {
        if self.worker.join().is_err() {
            debug!(stream = %self.stream, "feed worker panicked");
        }
    }
}

#[instrument(name = "feed_worker", skip(rx, captor, metrics), fields(stream = %stream))]
fn feed_worker<P>(
    stream: StreamId,
    rx: Receiver<P::Dispatch>,
    captor: Arc<BlockingCaptor<P>>,
    metrics: Arc<IngestMetrics>,
) where
    P: CapturePolicy,
{
    debug!("feed worker started");

    while let Ok(dispatch) = rx.recv_blocking() {
        captor.inject(dispatch);
        metrics.record_forwarded();
    }

    debug!(forwarded = metrics.forwarded(), "feed worker stopped");
}
