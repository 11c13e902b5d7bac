//! Policy traits - the capture rules a captor is parameterized by
//!
//! A policy is a small state machine over a queue: it decides readiness
//! without mutating (`dry_capture`), emits and retires elements on a wet
//! `capture`, and interprets abort boundaries in its own terms. Driver
//! policies additionally produce the [`CaptureRange`] that paces the group.

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch};

use crate::queue::DispatchBuffer;

/// Stamp type of a policy's dispatch.
pub type StampOf<P> = <<P as CapturePolicy>::Dispatch as Dispatch>::Stamp;

/// Dispatch type of a policy.
pub type DispatchOf<P> = <P as CapturePolicy>::Dispatch;

/// Behavior shared by driver and follower policies.
pub trait CapturePolicy {
    /// Element type this policy operates on.
    type Dispatch: Dispatch;

    /// Retire elements that can no longer satisfy the rule once the driving
    /// sequence has advanced to `boundary`. Each policy applies its own
    /// boundary interpretation.
    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<Self::Dispatch>;

    /// Clear auxiliary policy state (latched element, throttle gate).
    /// The queue itself is cleared by the captor.
    fn reset(&mut self) {}
}

/// A driving capture rule: consumes its own queue, produces the group range.
///
/// Drivers never self-abort; `dry_capture` reports `Primed` or `Retry` only.
pub trait DriverPolicy: CapturePolicy {
    /// Readiness without mutation.
    fn dry_capture<Q>(&self, queue: &Q) -> CaptureState
    where
        Q: DispatchBuffer<Self::Dispatch>;

    /// Candidate range for the next capture, without mutation.
    /// `None` exactly when `dry_capture` is not `Primed`.
    fn locate<Q>(&self, queue: &Q) -> Option<CaptureRange<StampOf<Self>>>
    where
        Q: DispatchBuffer<Self::Dispatch>;

    /// Emit and retire elements. Mutates only when the result is `Primed`,
    /// so a wet capture immediately after a dry check agrees with it.
    fn capture<Q, K>(
        &mut self,
        queue: &mut Q,
        sink: &mut K,
    ) -> (CaptureState, Option<CaptureRange<StampOf<Self>>>)
    where
        Q: DispatchBuffer<Self::Dispatch>,
        K: CaptureSink<Self::Dispatch>;
}

/// A following capture rule: selects elements relative to the driving range.
pub trait FollowerPolicy: CapturePolicy {
    /// Readiness against `range`, without mutation.
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<Self::Dispatch>;

    /// Emit and retire elements for `range`. Mutates only on `Primed`.
    fn capture<Q, K>(
        &mut self,
        queue: &mut Q,
        sink: &mut K,
        range: &CaptureRange<StampOf<Self>>,
    ) -> CaptureState
    where
        Q: DispatchBuffer<Self::Dispatch>,
        K: CaptureSink<Self::Dispatch>;
}
