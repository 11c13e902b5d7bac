//! Next - emit the oldest element, one per capture

use std::marker::PhantomData;

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch};

use crate::policy::{CapturePolicy, DriverPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Driving policy that emits the single oldest element with range
/// `[s0, s0]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Next<D> {
    _marker: PhantomData<fn() -> D>,
}

impl<D> Next<D> {
    /// New `Next` driver.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<D: Dispatch> CapturePolicy for Next<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        // The aborted range can never produce a frame; skip past it.
        queue.remove_at_before(boundary);
    }
}

impl<D: Dispatch> DriverPolicy for Next<D> {
    fn dry_capture<Q>(&self, queue: &Q) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        if queue.is_empty() {
            CaptureState::Retry
        } else {
            CaptureState::Primed
        }
    }

    fn locate<Q>(&self, queue: &Q) -> Option<CaptureRange<StampOf<Self>>>
    where
        Q: DispatchBuffer<D>,
    {
        queue.oldest_stamp().map(CaptureRange::at)
    }

    fn capture<Q, K>(
        &mut self,
        queue: &mut Q,
        sink: &mut K,
    ) -> (CaptureState, Option<CaptureRange<StampOf<Self>>>)
    where
        Q: DispatchBuffer<D>,
        K: CaptureSink<D>,
    {
        match queue.pop_oldest() {
            Some(dispatch) => {
                let range = CaptureRange::at(dispatch.stamp());
                sink.append(dispatch);
                (CaptureState::Primed, Some(range))
            }
            None => (CaptureState::Retry, None),
        }
    }
}
