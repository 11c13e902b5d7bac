//! Throttled - rate-limited single-element driver

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch, OffsetOf, SequencingStamp};

use crate::policy::{CapturePolicy, DriverPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Driving policy that emits the oldest element whose stamp is at least one
/// period past the previously emitted stamp, with range `[s, s]`.
///
/// While no element passes the gate the state is `Retry` and the queue is
/// retained untouched; on `Primed` everything at or before the emitted stamp
/// is retired. The gate advances only on `Primed`.
#[derive(Debug, Clone, Copy)]
pub struct Throttled<D: Dispatch> {
    period: OffsetOf<D>,
    last_emitted: Option<D::Stamp>,
}

impl<D: Dispatch> Throttled<D> {
    /// New throttle with the given minimum period between emissions.
    pub fn new(period: OffsetOf<D>) -> Self {
        Self {
            period,
            last_emitted: None,
        }
    }

    /// Stamp of the most recently emitted element, if any.
    pub fn last_emitted(&self) -> Option<D::Stamp> {
        self.last_emitted
    }

    fn gate_open(&self, stamp: D::Stamp) -> bool {
        match self.last_emitted {
            Some(last) => stamp >= last.shift_forward(self.period),
            None => true,
        }
    }

    fn next_eligible<Q>(&self, queue: &Q) -> Option<D::Stamp>
    where
        Q: DispatchBuffer<D>,
    {
        queue
            .iter()
            .map(Dispatch::stamp)
            .find(|&stamp| self.gate_open(stamp))
    }
}

impl<D: Dispatch> CapturePolicy for Throttled<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_at_before(boundary);
    }

    fn reset(&mut self) {
        self.last_emitted = None;
    }
}

impl<D: Dispatch> DriverPolicy for Throttled<D> {
    fn dry_capture<Q>(&self, queue: &Q) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        if self.next_eligible(queue).is_some() {
            CaptureState::Primed
        } else {
            CaptureState::Retry
        }
    }

    fn locate<Q>(&self, queue: &Q) -> Option<CaptureRange<StampOf<Self>>>
    where
        Q: DispatchBuffer<D>,
    {
        self.next_eligible(queue).map(CaptureRange::at)
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
        let Some(stamp) = self.next_eligible(queue) else {
            return (CaptureState::Retry, None);
        };

        // Drop the rate-limited prefix, emit the eligible element, and
        // retire anything sharing its stamp.
        queue.remove_before(stamp);
        if let Some(dispatch) = queue.pop_oldest() {
            sink.append(dispatch);
        }
        queue.remove_at_before(stamp);
        self.last_emitted = Some(stamp);

        (CaptureState::Primed, Some(CaptureRange::at(stamp)))
    }
}
