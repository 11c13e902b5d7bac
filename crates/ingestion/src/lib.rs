//! # Ingestion
//!
//! Stream ingestion fixtures.
//!
//! Responsibilities:
//! - Mock timed stream sources for pipelines without real transport
//! - Feed workers bridging dispatch channels into blocking captors
//! - Ingestion counters

mod feed;
mod metrics;
mod mock;

pub use feed::CaptorFeed;
pub use metrics::{IngestMetrics, IngestSnapshot};
pub use mock::{MockStreamConfig, MockStreamSource, StreamDispatch};
