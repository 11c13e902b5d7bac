//! # Contracts
//!
//! Frozen interface contracts (ICD), defining the shared traits and data
//! structures of the capture synchronization workspace. All business crates
//! depend only on this crate; reverse dependencies are prohibited.
//!
//! ## Sequencing model
//! - Every stream element carries a totally ordered sequencing stamp,
//!   monotonically non-decreasing per stream
//! - Delays and periods are expressed in the stamp's offset type

mod config;
mod dispatch;
mod error;
mod range;
mod sink;
mod stamp;
mod state;

pub use config::*;
pub use dispatch::{Dispatch, OffsetOf, Stamped};
pub use error::SyncError;
pub use range::CaptureRange;
pub use sink::{CaptureSink, CountingSink};
pub use stamp::SequencingStamp;
pub use state::CaptureState;

/// Stream label attached to captors, sinks, and metric tags. Labels are
/// created once at configuration time and cloned on every log line, so a
/// shared `str` keeps the clones to reference-count bumps.
pub type StreamId = std::sync::Arc<str>;
