//! MatchedStamp - emit the element whose stamp equals the range lower bound

use std::marker::PhantomData;

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits the single element with `stamp == range.lower`.
///
/// When the oldest queued stamp is already past the target, a match can
/// never arrive and the state is `Abort`; the group then advances past the
/// unmatchable range.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchedStamp<D> {
    _marker: PhantomData<fn() -> D>,
}

impl<D> MatchedStamp<D> {
    /// New exact-match follower.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<D: Dispatch> CapturePolicy for MatchedStamp<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        // Keep an element exactly at the boundary: the next range may still
        // start there.
        queue.remove_before(boundary);
    }
}

impl<D: Dispatch> FollowerPolicy for MatchedStamp<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let Some(oldest) = queue.oldest_stamp() else {
            return CaptureState::Retry;
        };
        if oldest > range.lower {
            return CaptureState::Abort;
        }
        if queue.iter().any(|d| d.stamp() == range.lower) {
            CaptureState::Primed
        } else {
            CaptureState::Retry
        }
    }

    fn capture<Q, K>(
        &mut self,
        queue: &mut Q,
        sink: &mut K,
        range: &CaptureRange<StampOf<Self>>,
    ) -> CaptureState
    where
        Q: DispatchBuffer<D>,
        K: CaptureSink<D>,
    {
        let state = self.dry_capture(queue, range);
        if !state.is_primed() {
            return state;
        }

        if let Some(dispatch) = queue.iter().find(|d| d.stamp() == range.lower).cloned() {
            sink.append(dispatch);
        }
        queue.remove_at_before(range.lower);

        CaptureState::Primed
    }
}
