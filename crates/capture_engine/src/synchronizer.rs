//! Synchronizer - stateless group orchestration
//!
//! Composes one driver capture with N follower captures so that group
//! capture is atomic: every follower is dry-checked against the candidate
//! range first, and queues are mutated only when the whole group is primed.
//! Captor locks are taken in tuple order, driver first; external code taking
//! multiple captor locks must honor the same order.

use std::time::Instant;

use metrics::counter;
use tracing::{debug, instrument, trace};

use contracts::{CaptureRange, CaptureState, SequencingStamp};

use crate::captor::{DriverHandle, DriverProbe, FollowerHandle, FollowerProbe};
use crate::notifier::{GroupNotifier, WaitVerdict};

/// Result of one group capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCapture<S> {
    /// Reduced group state.
    pub state: CaptureState,
    /// The driving range of the attempt, when the driver was ready.
    pub range: Option<CaptureRange<S>>,
}

impl<S> GroupCapture<S> {
    fn from_state(state: CaptureState) -> Self {
        Self { state, range: None }
    }

    /// True when the group produced a frame.
    pub fn is_primed(&self) -> bool {
        self.state.is_primed()
    }
}

/// Dry-phase surface of a follower tuple.
///
/// Implemented for tuples of [`FollowerProbe`] up to arity 8, and for the
/// empty tuple (a driver-only group).
pub trait FollowerProbeSet<S: SequencingStamp> {
    /// Dry-check every follower in tuple order and reduce the states.
    fn dry_capture_all(&self, range: &CaptureRange<S>) -> CaptureState;

    /// Broadcast an abort boundary to every follower.
    fn abort_all(&self, boundary: S);

    /// Broadcast a reset to every follower.
    fn reset_all(&self);
}

/// Wet-phase surface of a follower tuple paired with its sink tuple.
pub trait FollowerSet<S: SequencingStamp, Sinks>: FollowerProbeSet<S> {
    /// Capture every follower in tuple order into its parallel sink.
    fn capture_all(&self, sinks: &mut Sinks, range: &CaptureRange<S>) -> CaptureState;
}

impl<S: SequencingStamp> FollowerProbeSet<S> for () {
    fn dry_capture_all(&self, _range: &CaptureRange<S>) -> CaptureState {
        CaptureState::Primed
    }

    fn abort_all(&self, _boundary: S) {}

    fn reset_all(&self) {}
}

impl<S: SequencingStamp> FollowerSet<S, ()> for () {
    fn capture_all(&self, _sinks: &mut (), _range: &CaptureRange<S>) -> CaptureState {
        CaptureState::Primed
    }
}

macro_rules! impl_follower_set {
    ($(($F:ident, $K:ident, $idx:tt)),+) => {
        impl<S, $($F),+> FollowerProbeSet<S> for ($($F,)+)
        where
            S: SequencingStamp,
            $($F: FollowerProbe<Stamp = S>),+
        {
            fn dry_capture_all(&self, range: &CaptureRange<S>) -> CaptureState {
                let mut state = CaptureState::Primed;
                $( state = state.combine(self.$idx.dry_capture(range)); )+
                state
            }

            fn abort_all(&self, boundary: S) {
                $( self.$idx.abort_at(boundary); )+
            }

            fn reset_all(&self) {
                $( self.$idx.reset_captor(); )+
            }
        }

        impl<S, $($F,)+ $($K),+> FollowerSet<S, ($($K,)+)> for ($($F,)+)
        where
            S: SequencingStamp,
            $($F: FollowerHandle<$K, Stamp = S>),+
        {
            fn capture_all(&self, sinks: &mut ($($K,)+), range: &CaptureRange<S>) -> CaptureState {
                let mut state = CaptureState::Primed;
                $( state = state.combine(self.$idx.capture(&mut sinks.$idx, range)); )+
                state
            }
        }
    };
}

impl_follower_set!((F0, K0, 0));
impl_follower_set!((F0, K0, 0), (F1, K1, 1));
impl_follower_set!((F0, K0, 0), (F1, K1, 1), (F2, K2, 2));
impl_follower_set!((F0, K0, 0), (F1, K1, 1), (F2, K2, 2), (F3, K3, 3));
impl_follower_set!((F0, K0, 0), (F1, K1, 1), (F2, K2, 2), (F3, K3, 3), (F4, K4, 4));
impl_follower_set!(
    (F0, K0, 0),
    (F1, K1, 1),
    (F2, K2, 2),
    (F3, K3, 3),
    (F4, K4, 4),
    (F5, K5, 5)
);
impl_follower_set!(
    (F0, K0, 0),
    (F1, K1, 1),
    (F2, K2, 2),
    (F3, K3, 3),
    (F4, K4, 4),
    (F5, K5, 5),
    (F6, K6, 6)
);
impl_follower_set!(
    (F0, K0, 0),
    (F1, K1, 1),
    (F2, K2, 2),
    (F3, K3, 3),
    (F4, K4, 4),
    (F5, K5, 5),
    (F6, K6, 6),
    (F7, K7, 7)
);

/// Stateless group orchestrator.
pub struct Synchronizer;

impl Synchronizer {
    /// One atomic group capture attempt.
    ///
    /// The dry pass runs first (driver readiness, candidate range, follower
    /// readiness); only when the reduction is `Primed` does the wet pass
    /// mutate any queue. On a follower `Abort` every captor retires elements
    /// up to its own reading of the range upper bound and no outputs are
    /// emitted. On `Retry` nothing is mutated anywhere.
    #[instrument(name = "sync_group_capture", level = "debug", skip_all)]
    pub fn capture<Drv, DK, Fls, Ks>(
        driver: &Drv,
        driver_sink: &mut DK,
        followers: &Fls,
        follower_sinks: &mut Ks,
    ) -> GroupCapture<Drv::Stamp>
    where
        Drv: DriverHandle<DK>,
        Fls: FollowerSet<Drv::Stamp, Ks>,
    {
        let result = Self::attempt(driver, followers, |range| {
            let (driver_state, committed) = driver.capture(driver_sink);
            let follower_state = followers.capture_all(follower_sinks, range);
            GroupCapture {
                state: driver_state.combine(follower_state),
                range: committed.or(Some(*range)),
            }
        });

        counter!("sync_group_captures_total", "state" => result.state.as_str()).increment(1);
        result
    }

    /// Group readiness without mutating anything.
    #[instrument(name = "sync_group_dry_capture", level = "trace", skip_all)]
    pub fn dry_capture<Drv, Fls>(driver: &Drv, followers: &Fls) -> GroupCapture<Drv::Stamp>
    where
        Drv: DriverProbe,
        Fls: FollowerProbeSet<Drv::Stamp>,
    {
        let driver_state = driver.dry_capture();
        if !driver_state.is_primed() {
            return GroupCapture::from_state(driver_state);
        }
        let Some(range) = driver.locate() else {
            return GroupCapture::from_state(CaptureState::Retry);
        };
        GroupCapture {
            state: followers.dry_capture_all(&range),
            range: Some(range),
        }
    }

    /// Block until a group attempt leaves `Retry`, the deadline passes, or
    /// an abort/reset lands.
    ///
    /// Every captor in the group must share `notifier`, so the attempt
    /// re-enters whenever any stream makes progress.
    #[instrument(name = "sync_group_capture_until", level = "debug", skip_all)]
    pub fn capture_until<Drv, DK, Fls, Ks>(
        driver: &Drv,
        driver_sink: &mut DK,
        followers: &Fls,
        follower_sinks: &mut Ks,
        deadline: Instant,
        notifier: &GroupNotifier,
    ) -> GroupCapture<Drv::Stamp>
    where
        Drv: DriverHandle<DK>,
        Fls: FollowerSet<Drv::Stamp, Ks>,
    {
        loop {
            let seen = notifier.observe();
            let result = Self::capture(driver, driver_sink, followers, follower_sinks);
            if result.state != CaptureState::Retry {
                return result;
            }

            match notifier.wait_past(seen, deadline) {
                WaitVerdict::Data => trace!("group woken by inject"),
                WaitVerdict::Aborted => {
                    return GroupCapture::from_state(CaptureState::Abort);
                }
                WaitVerdict::TimedOut => {
                    counter!("sync_group_captures_total", "state" => "timeout").increment(1);
                    return GroupCapture::from_state(CaptureState::Timeout);
                }
            }
        }
    }

    /// Broadcast an abort boundary to the whole group.
    #[instrument(name = "sync_group_abort", level = "debug", skip_all)]
    pub fn abort<Drv, Fls>(driver: &Drv, followers: &Fls, boundary: Drv::Stamp)
    where
        Drv: DriverProbe,
        Fls: FollowerProbeSet<Drv::Stamp>,
    {
        driver.abort_at(boundary);
        followers.abort_all(boundary);
    }

    /// Clear every captor's queue and policy state.
    #[instrument(name = "sync_group_reset", level = "debug", skip_all)]
    pub fn reset<Drv, Fls>(driver: &Drv, followers: &Fls)
    where
        Drv: DriverProbe,
        Fls: FollowerProbeSet<Drv::Stamp>,
    {
        driver.reset_captor();
        followers.reset_all();
    }

    /// Shared dry phase; `commit` runs only on a fully primed group.
    fn attempt<Drv, Fls>(
        driver: &Drv,
        followers: &Fls,
        commit: impl FnOnce(&CaptureRange<Drv::Stamp>) -> GroupCapture<Drv::Stamp>,
    ) -> GroupCapture<Drv::Stamp>
    where
        Drv: DriverProbe,
        Fls: FollowerProbeSet<Drv::Stamp>,
    {
        let driver_state = driver.dry_capture();
        if !driver_state.is_primed() {
            return GroupCapture::from_state(driver_state);
        }

        let Some(range) = driver.locate() else {
            return GroupCapture::from_state(CaptureState::Retry);
        };

        match followers.dry_capture_all(&range) {
            CaptureState::Primed => commit(&range),
            CaptureState::Abort => {
                debug!(upper = ?range.upper, "group abort, retiring stale elements");
                driver.abort_at(range.upper);
                followers.abort_all(range.upper);
                GroupCapture {
                    state: CaptureState::Abort,
                    range: Some(range),
                }
            }
            not_ready => GroupCapture {
                state: not_ready,
                range: Some(range),
            },
        }
    }
}
