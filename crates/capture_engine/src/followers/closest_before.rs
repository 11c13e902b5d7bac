//! ClosestBefore - emit the element nearest below the boundary within a
//! lookback period

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits the one element whose stamp is the largest inside
/// `(boundary - period, boundary)` where `boundary = range.lower - delay`.
///
/// A witness at or past the boundary finalizes the choice: before it
/// arrives, a closer candidate could still show up. When the stream has
/// passed the boundary without leaving a candidate in the window, the rule
/// can never be satisfied for this range and the state is `Abort`.
#[derive(Debug, Clone, Copy)]
pub struct ClosestBefore<D: Dispatch> {
    delay: OffsetOf<D>,
    period: OffsetOf<D>,
}

impl<D: Dispatch> ClosestBefore<D> {
    /// New follower with boundary delay and lookback period.
    pub fn new(delay: OffsetOf<D>, period: OffsetOf<D>) -> Self {
        Self { delay, period }
    }

    fn boundary(&self, range: &CaptureRange<D::Stamp>) -> D::Stamp {
        range.lower.shift_back(self.delay)
    }

    fn candidate<Q>(&self, queue: &Q, boundary: D::Stamp) -> Option<D>
    where
        Q: DispatchBuffer<D>,
    {
        let floor = boundary.shift_back(self.period);
        queue
            .iter()
            .filter(|d| d.stamp() > floor && d.stamp() < boundary)
            .last()
            .cloned()
    }

    fn has_witness<Q>(&self, queue: &Q, boundary: D::Stamp) -> bool
    where
        Q: DispatchBuffer<D>,
    {
        queue.newest_stamp().is_some_and(|stamp| stamp >= boundary)
    }
}

impl<D: Dispatch> CapturePolicy for ClosestBefore<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        // Elements below the window floor for the aborted boundary can never
        // be candidates again.
        queue.remove_before(boundary.shift_back(self.delay).shift_back(self.period));
    }
}

impl<D: Dispatch> FollowerPolicy for ClosestBefore<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let boundary = self.boundary(range);
        match (
            self.candidate(queue, boundary).is_some(),
            self.has_witness(queue, boundary),
        ) {
            (true, true) => CaptureState::Primed,
            (false, true) => CaptureState::Abort,
            _ => CaptureState::Retry,
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
        if let Some(dispatch) = self.candidate(queue, boundary) {
            let emitted = dispatch.stamp();
            sink.append(dispatch);
            queue.remove_at_before(emitted);
        }
        CaptureState::Primed
    }
}
