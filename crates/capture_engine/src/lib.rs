//! # Capture Engine
//!
//! Policy-driven multi-stream capture synchronization.
//!
//! Responsibilities:
//! - Per-stream captors: ordered buffer + capture policy + lock policy
//! - Driver policies that produce the group's driving range
//! - Follower policies that select elements relative to that range
//! - Stateless group synchronization, polling or blocking
//!
//! ## Usage
//!
//! ```
//! use capture_engine::{Captor, PollingCaptor, Synchronizer};
//! use capture_engine::drivers::Next;
//! use capture_engine::followers::ClosestBefore;
//! use contracts::Stamped;
//!
//! type Frame = Stamped<i64, &'static str>;
//!
//! let driver: PollingCaptor<Next<Frame>> = Captor::new(Next::new());
//! let follower: PollingCaptor<ClosestBefore<Frame>> =
//!     Captor::new(ClosestBefore::new(0, 10));
//!
//! driver.inject(Stamped::new(10, "drive"));
//! follower.inject(Stamped::new(8, "follow"));
//! follower.inject(Stamped::new(12, "follow"));
//!
//! let mut driver_out = Vec::new();
//! let mut follower_out = (Vec::new(),);
//! let result = Synchronizer::capture(
//!     &driver,
//!     &mut driver_out,
//!     &(&follower,),
//!     &mut follower_out,
//! );
//! assert!(result.is_primed());
//! ```

pub mod captor;
pub mod drivers;
pub mod followers;
pub mod lock;
pub mod notifier;
pub mod policy;
pub mod queue;
pub mod sinks;
pub mod synchronizer;

pub use captor::{
    BlockingCaptor, Captor, CaptorCore, DriverHandle, DriverProbe, FollowerHandle, FollowerProbe,
    PollingCaptor,
};
pub use contracts::{
    CaptureRange, CaptureSink, CaptureState, Dispatch, SequencingStamp, Stamped,
};
pub use lock::{LockPolicy, Mutexed, Unlocked};
pub use notifier::{GroupNotifier, WaitVerdict};
pub use policy::{CapturePolicy, DriverPolicy, FollowerPolicy};
pub use queue::{CaptureQueue, DispatchBuffer};
pub use sinks::{ChannelSink, LogSink};
pub use synchronizer::{FollowerProbeSet, FollowerSet, GroupCapture, Synchronizer};
