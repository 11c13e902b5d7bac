//! Latched - hold the last emission until a newer candidate arrives
//!
//! The one policy allowed to re-emit: slow state-like streams (calibration,
//! health, configuration) keep contributing their most recent value to every
//! frame.

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, FollowerPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Follower that emits the newest element with
/// `stamp <= range.lower - min_period`, remembering it; when no new
/// candidate exists the remembered element is emitted again.
#[derive(Debug, Clone)]
pub struct Latched<D: Dispatch> {
    min_period: OffsetOf<D>,
    latched: Option<D>,
}

impl<D: Dispatch> Latched<D> {
    /// New follower with the given minimum age relative to the range.
    pub fn new(min_period: OffsetOf<D>) -> Self {
        Self {
            min_period,
            latched: None,
        }
    }

    /// The remembered element, if any.
    pub fn latched(&self) -> Option<&D> {
        self.latched.as_ref()
    }

    fn boundary(&self, range: &CaptureRange<D::Stamp>) -> D::Stamp {
        range.lower.shift_back(self.min_period)
    }

    fn candidate<Q>(&self, queue: &Q, boundary: D::Stamp) -> Option<D>
    where
        Q: DispatchBuffer<D>,
    {
        queue
            .iter()
            .take_while(|d| d.stamp() <= boundary)
            .last()
            .cloned()
    }
}

impl<D: Dispatch> CapturePolicy for Latched<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_before(boundary.shift_back(self.min_period));
    }

    fn reset(&mut self) {
        self.latched = None;
    }
}

impl<D: Dispatch> FollowerPolicy for Latched<D> {
    fn dry_capture<Q>(&self, queue: &Q, range: &CaptureRange<StampOf<Self>>) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        let boundary = self.boundary(range);
        let has_candidate = queue
            .oldest_stamp()
            .is_some_and(|stamp| stamp <= boundary);
        if has_candidate || self.latched.is_some() {
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
        let boundary = self.boundary(range);
        if let Some(dispatch) = self.candidate(queue, boundary) {
            // The emitted element stays queued so the latch survives resets
            // of the range; only strictly older elements are retired.
            queue.remove_before(dispatch.stamp());
            sink.append(dispatch.clone());
            self.latched = Some(dispatch);
            CaptureState::Primed
        } else if let Some(latched) = &self.latched {
            sink.append(latched.clone());
            CaptureState::Primed
        } else {
            CaptureState::Retry
        }
    }
}
