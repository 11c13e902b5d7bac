//! Driver policies - capture rules that produce the group range
//!
//! A driver consumes its own queue to produce the [`CaptureRange`] that
//! drives every follower in the group. Drivers report `Retry` until ready
//! and never self-abort; the group abort path retires their elements.
//!
//! [`CaptureRange`]: contracts::CaptureRange

mod batch;
mod chunk;
mod next;
mod throttled;

pub use batch::Batch;
pub use chunk::Chunk;
pub use next::Next;
pub use throttled::Throttled;
