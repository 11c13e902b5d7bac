//! Ranged - emit the elements bracketing the delayed range
//!
//! Selects one element on each side of the shifted window plus everything
//! inside it, giving downstream consumers the bracketing pair needed to
//! interpolate across the window without the engine interpolating itself.

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that, for `L = range.lower - delay` and `U = range.upper - delay`,
/// emits the element with the largest stamp below `L`, every element in
/// `[L, U]`, and the element with the smallest stamp above `U`.
#[derive(Debug, Clone, Copy)]
pub struct Ranged<D: Dispatch> {
    delay: OffsetOf<D>,
}

impl<D: Dispatch> Ranged<D> {
    /// New follower with the given boundary delay.
    pub fn new(delay: OffsetOf<D>) -> Self {
        Self { delay }
    }

    fn window(&self, range: &CaptureRange<D::Stamp>) -> (D::Stamp, D::Stamp) {
        (
            range.lower.shift_back(self.delay),
            range.upper.shift_back(self.delay),
        )
    }
}

impl<D: Dispatch> CapturePolicy for Ranged<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_before(boundary.shift_back(self.delay));
    }
}

impl<D: Dispatch> FollowerPolicy for Ranged<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let (lower, upper) = self.window(range);
        let has_lower_witness = queue.oldest_stamp().is_some_and(|stamp| stamp < lower);
        let has_upper_witness = queue.newest_stamp().is_some_and(|stamp| stamp > upper);

        if has_lower_witness && has_upper_witness {
            return CaptureState::Primed;
        }
        // The stream opened past the lower edge: a bracketing element below
        // it can never arrive.
        if !has_lower_witness && queue.oldest_stamp().is_some_and(|stamp| stamp > lower) {
            return CaptureState::Abort;
        }
        CaptureState::Retry
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

        let (lower, upper) = self.window(range);
        let lower_witness = queue
            .iter()
            .take_while(|d| d.stamp() < lower)
            .last()
            .cloned();
        if let Some(dispatch) = lower_witness {
            sink.append(dispatch);
        }
        for dispatch in queue
            .iter()
            .filter(|d| lower <= d.stamp() && d.stamp() <= upper)
            .cloned()
            .collect::<Vec<_>>()
        {
            sink.append(dispatch);
        }
        let upper_witness = queue.iter().find(|d| d.stamp() > upper).cloned();
        if let Some(dispatch) = upper_witness {
            sink.append(dispatch);
        }

        // Keep only the upper-side bracket and newer; it becomes the
        // lower-side bracket of the next window.
        queue.remove_at_before(upper);

        CaptureState::Primed
    }
}
