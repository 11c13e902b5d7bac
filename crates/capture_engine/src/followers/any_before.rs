//! AnyBefore - emit everything before the delayed range upper bound
//!
//! The "optional stream" policy: it is always primed, even when its queue is
//! empty, so it never holds the group back.

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits every element with `stamp < range.upper - delay`.
#[derive(Debug, Clone, Copy)]
pub struct AnyBefore<D: Dispatch> {
    delay: OffsetOf<D>,
}

impl<D: Dispatch> AnyBefore<D> {
    /// New follower with the given boundary delay.
    pub fn new(delay: OffsetOf<D>) -> Self {
        Self { delay }
    }

    fn boundary(&self, range: &CaptureRange<D::Stamp>) -> D::Stamp {
        range.upper.shift_back(self.delay)
    }
}

impl<D: Dispatch> CapturePolicy for AnyBefore<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_before(boundary.shift_back(self.delay));
    }
}

impl<D: Dispatch> FollowerPolicy for AnyBefore<D> {
    fn dry_capture<Q>(&self, _queue: &Q, _range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        CaptureState::Primed
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
        let boundary = self.boundary(range);
        while queue.oldest_stamp().is_some_and(|stamp| stamp < boundary) {
            if let Some(dispatch) = queue.pop_oldest() {
                sink.append(dispatch);
            }
        }
        CaptureState::Primed
    }
}
