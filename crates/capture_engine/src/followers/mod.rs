//! Follower policies - capture rules driven by the group range
//!
//! A follower selects elements from its own queue relative to the
//! [`CaptureRange`] the driver produced, shifting the effective boundary by
//! a per-policy delay. Followers report `Abort` when the driving sequence
//! has provably advanced past the point where their rule could ever be
//! satisfied.
//!
//! [`CaptureRange`]: contracts::CaptureRange

mod any_before;
mod before;
mod closest_before;
mod count_before;
mod latched;
mod matched_stamp;
mod ranged;

pub use any_before::AnyBefore;
pub use before::Before;
pub use closest_before::ClosestBefore;
pub use count_before::CountBefore;
pub use latched::Latched;
pub use matched_stamp::MatchedStamp;
pub use ranged::Ranged;
