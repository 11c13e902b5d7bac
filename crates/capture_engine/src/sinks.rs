//! Bundled capture sinks
//!
//! `Vec` and `VecDeque` already implement [`CaptureSink`] for collection;
//! these sinks cover logging and handing frames out of the capture thread.

use async_channel::{Receiver, Sender, TrySendError};
use metrics::counter;
use tracing::{debug, warn};

use contracts::{CaptureSink, Dispatch, StreamId};

/// Sink that logs each emission via `tracing`, for debugging pipelines.
pub struct LogSink {
    stream: StreamId,
}

impl LogSink {
    /// New log sink tagged with a stream label.
    pub fn new(stream: impl Into<StreamId>) -> Self {
        Self {
            stream: stream.into(),
        }
    }

    /// Stream label.
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }
}

impl<D: Dispatch> CaptureSink<D> for LogSink {
    fn append(&mut self, dispatch: D) {
        debug!(
            stream = %self.stream,
            stamp = ?dispatch.stamp(),
            "dispatch captured"
        );
    }
}

/// Sink that forwards emissions into a bounded channel.
///
/// The capture thread never blocks: when the channel is full the dispatch is
/// dropped and counted, isolating slow consumers from the capture loop.
pub struct ChannelSink<D> {
    stream: StreamId,
    tx: Sender<D>,
    dropped: u64,
}

impl<D> ChannelSink<D> {
    /// New channel sink with the given capacity; returns the consumer side.
    pub fn bounded(stream: impl Into<StreamId>, capacity: usize) -> (Self, Receiver<D>) {
        let (tx, rx) = async_channel::bounded(capacity);
        (
            Self {
                stream: stream.into(),
                tx,
                dropped: 0,
            },
            rx,
        )
    }

    /// Number of dispatches dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<D: Dispatch> CaptureSink<D> for ChannelSink<D> {
    fn append(&mut self, dispatch: D) {
        match self.tx.try_send(dispatch) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                counter!(
                    "capture_sink_dropped_total",
                    "stream" => self.stream.to_string()
                )
                .increment(1);
                warn!(stream = %self.stream, "sink channel full, dispatch dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(stream = %self.stream, "sink channel closed, dispatch dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Stamped;

    type TestDispatch = Stamped<i64, u32>;

    #[test]
    fn test_channel_sink_forwards() {
        let (mut sink, rx) = ChannelSink::bounded("cam", 4);
        sink.append(TestDispatch::new(1, 10));
        sink.append(TestDispatch::new(2, 20));

        assert_eq!(rx.recv_blocking().unwrap().stamp(), 1);
        assert_eq!(rx.recv_blocking().unwrap().stamp(), 2);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (mut sink, rx) = ChannelSink::bounded("cam", 1);
        sink.append(TestDispatch::new(1, 10));
        sink.append(TestDispatch::new(2, 20));

        assert_eq!(sink.dropped(), 1);
        assert_eq!(rx.recv_blocking().unwrap().stamp(), 1);
    }

    #[test]
    fn test_log_sink_accepts_anything() {
        let mut sink = LogSink::new("lidar");
        sink.append(TestDispatch::new(5, 0));
        assert_eq!(&**sink.stream(), "lidar");
    }
}
