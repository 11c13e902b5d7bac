//! CountBefore - emit the N newest elements before the boundary

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits the `count` newest elements with
/// `stamp < range.lower - delay`, in ascending stamp order.
///
/// Readiness requires a witness at or past the boundary; stamps are monotone
/// per stream, so once a witness is queued the set of elements below the
/// boundary is final. A deficit at that point can never be made up and the
/// state is `Abort`.
#[derive(Debug, Clone, Copy)]
pub struct CountBefore<D: Dispatch> {
    count: usize,
    delay: OffsetOf<D>,
}

impl<D: Dispatch> CountBefore<D> {
    /// New follower requiring `count` elements before the delayed boundary;
    /// `count` must be at least 1.
    pub fn new(count: usize, delay: OffsetOf<D>) -> Self {
        assert!(count > 0, "count must be at least 1");
        Self { count, delay }
    }

    fn boundary(&self, range: &CaptureRange<D::Stamp>) -> D::Stamp {
        range.lower.shift_back(self.delay)
    }
}

impl<D: Dispatch> CapturePolicy for CountBefore<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_before(boundary.shift_back(self.delay));
    }
}

impl<D: Dispatch> FollowerPolicy for CountBefore<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let boundary = self.boundary(range);
        if !queue.newest_stamp().is_some_and(|stamp| stamp >= boundary) {
            return CaptureState::Retry;
        }

        let available = queue.iter().filter(|d| d.stamp() < boundary).count();
        if available >= self.count {
            CaptureState::Primed
        } else {
            CaptureState::Abort
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
        let below: Vec<D> = queue
            .iter()
            .filter(|d| d.stamp() < boundary)
            .cloned()
            .collect();
        let newest_n = below.len() - self.count;
        for dispatch in below.into_iter().skip(newest_n) {
            sink.append(dispatch);
        }
        queue.remove_before(boundary);

        CaptureState::Primed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{stamps, CaptureQueue};
    use contracts::Stamped;

    fn queue_of(input: &[i64]) -> CaptureQueue<Stamped<i64, ()>> {
        let mut queue = CaptureQueue::new();
        for &s in input {
            queue.insert(Stamped::new(s, ()));
        }
        queue
    }

    #[test]
    fn test_no_witness_is_retry() {
        let mut queue = queue_of(&[3, 4]);
        let mut policy = CountBefore::new(2, 0);
        let mut sink = Vec::new();

        let range = CaptureRange::new(5, 6);
        assert_eq!(policy.dry_capture(&queue, &range), CaptureState::Retry);
        let state = policy.capture(&mut queue, &mut sink, &range);
        assert_eq!(state, CaptureState::Retry);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_emits_newest_n_ascending() {
        let mut queue = queue_of(&[1, 2, 3, 4, 6]);
        let mut policy = CountBefore::new(2, 0);
        let mut sink = Vec::new();

        // Boundary 5: four elements below, emit the two newest (3, 4).
        let range = CaptureRange::new(5, 6);
        let state = policy.capture(&mut queue, &mut sink, &range);
        assert_eq!(state, CaptureState::Primed);
        let emitted: Vec<i64> = sink.iter().map(Dispatch::stamp).collect();
        assert_eq!(emitted, vec![3, 4]);
        assert_eq!(stamps(&queue), vec![6]);
    }

    #[test]
    fn test_witness_with_deficit_aborts() {
        let mut queue = queue_of(&[4, 6]);
        let mut policy = CountBefore::new(2, 0);
        let mut sink = Vec::new();

        // The stream already reached 6; only one element below 5 will ever
        // exist.
        let range = CaptureRange::new(5, 6);
        assert_eq!(policy.dry_capture(&queue, &range), CaptureState::Abort);
        let state = policy.capture(&mut queue, &mut sink, &range);
        assert_eq!(state, CaptureState::Abort);
        assert!(sink.is_empty());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_delay_shifts_boundary() {
        let mut queue = queue_of(&[1, 2, 5]);
        let mut policy = CountBefore::new(2, 2);
        let mut sink = Vec::new();

        // Boundary = 5 - 2 = 3: both 1 and 2 qualify, 5 is the witness.
        let range = CaptureRange::new(5, 6);
        let state = policy.capture(&mut queue, &mut sink, &range);
        assert_eq!(state, CaptureState::Primed);
        let emitted: Vec<i64> = sink.iter().map(Dispatch::stamp).collect();
        assert_eq!(emitted, vec![1, 2]);
    }
}
