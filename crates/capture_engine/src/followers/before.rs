//! Before - emit everything before the delayed range lower bound, gated on
//! a boundary witness

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits every element with `stamp < range.lower - delay`,
/// but only once at least one element at or past that boundary has been
/// observed. The witness proves the prefix is complete: per-stream stamps
/// are monotone, so nothing older can still arrive.
#[derive(Debug, Clone, Copy)]
pub struct Before<D: Dispatch> {
    delay: OffsetOf<D>,
}

impl<D: Dispatch> Before<D> {
    /// New follower with the given boundary delay.
    pub fn new(delay: OffsetOf<D>) -> Self {
        Self { delay }
    }

    fn boundary(&self, range: &CaptureRange<D::Stamp>) -> D::Stamp {
        range.lower.shift_back(self.delay)
    }
}

impl<D: Dispatch> CapturePolicy for Before<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_before(boundary.shift_back(self.delay));
    }
}

impl<D: Dispatch> FollowerPolicy for Before<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let boundary = self.boundary(range);
        if queue.newest_stamp().is_some_and(|stamp| stamp >= boundary) {
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

        let boundary = self.boundary(range);
        while queue.oldest_stamp().is_some_and(|stamp| stamp < boundary) {
            if let Some(dispatch) = queue.pop_oldest() {
                sink.append(dispatch);
            }
        }
        CaptureState::Primed
    }
}
