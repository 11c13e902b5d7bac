//! Mock stream source
//!
//! Generates stamped dispatches at a fixed rate on a background thread, for
//! testing capture pipelines without real transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use async_channel::{bounded, Receiver, TrySendError};
use bytes::Bytes;
use contracts::{Stamped, StreamId};
use tracing::{debug, trace};

use crate::metrics::IngestMetrics;

/// Dispatch type produced by mock sources: microsecond stamps over opaque
/// payload bytes.
pub type StreamDispatch = Stamped<u64, Bytes>;

/// Mock stream source configuration.
#[derive(Debug, Clone)]
pub struct MockStreamConfig {
    /// Stream label.
    pub stream: StreamId,

    /// Emission frequency (Hz).
    pub frequency_hz: f64,

    /// Payload size per dispatch.
    pub payload_bytes: usize,
}

impl Default for MockStreamConfig {
    fn default() -> Self {
        Self {
            stream: "mock_stream".into(),
            frequency_hz: 10.0,
            payload_bytes: 64,
        }
    }
}

/// Mock stream source.
///
/// Stamps are microseconds since the source started, so they are monotone
/// per stream the way the capture queue expects.
pub struct MockStreamSource {
    config: MockStreamConfig,
    running: Arc<AtomicBool>,
}

impl MockStreamSource {
    /// New source from a full configuration.
    pub fn new(config: MockStreamConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// New source with just a label and rate.
    pub fn with_rate(stream: &str, frequency_hz: f64) -> Self {
        Self::new(MockStreamConfig {
            stream: stream.into(),
            frequency_hz,
            ..Default::default()
        })
    }

    /// Start the source, returning the dispatch stream receiver.
    ///
    /// The producer never blocks: when the channel is full the dispatch is
    /// dropped and counted, like a real sensor outrunning its consumer. The
    /// thread stops when [`Self::stop`] is called or every receiver is
    /// dropped.
    pub fn start(
        &self,
        channel_capacity: usize,
        metrics: Option<Arc<IngestMetrics>>,
    ) -> Receiver<StreamDispatch> {
        let (tx, rx) = bounded(channel_capacity);
        let config = self.config.clone();
        let running = self.running.clone();
        let metrics = metrics.unwrap_or_else(|| Arc::new(IngestMetrics::new()));

        running.store(true, Ordering::SeqCst);

        thread::spawn(move || {
            let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);
            let origin = Instant::now();
            let payload = Bytes::from(vec![0u8; config.payload_bytes]);

            debug!(
                stream = %config.stream,
                frequency_hz = config.frequency_hz,
                "mock stream source started"
            );

            while running.load(Ordering::Relaxed) {
                let stamp = origin.elapsed().as_micros() as u64;
                let dispatch = StreamDispatch::new(stamp, payload.clone());

                metrics.record_received();

                match tx.try_send(dispatch) {
                    Ok(()) => {
                        trace!(stream = %config.stream, stamp, "mock dispatch sent");
                    }
                    Err(TrySendError::Full(_)) => {
                        metrics.record_dropped();
                        trace!(stream = %config.stream, stamp, "consumer behind, dispatch dropped");
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(stream = %config.stream, "mock stream channel closed");
                        break;
                    }
                }

                thread::sleep(interval);
            }

            debug!(stream = %config.stream, "mock stream source stopped");
        });

        rx
    }

    /// Stop the producer thread.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check whether the producer is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
