//! Chunk - emit and retire the N oldest elements

use std::marker::PhantomData;

use contracts::{CaptureRange, CaptureSink, CaptureState, Dispatch};

use crate::policy::{CapturePolicy, DriverPolicy, StampOf};
use crate::queue::DispatchBuffer;

/// Driving policy that emits the N oldest elements with range
/// `[s0, s(N-1)]` and retires all of them, so capture windows never overlap.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<D> {
    size: usize,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Chunk<D> {
    /// New chunk of `size` elements; `size` must be at least 1.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "chunk size must be at least 1");
        Self {
            size,
            _marker: PhantomData,
        }
    }

    /// Chunk size.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<D: Dispatch> CapturePolicy for Chunk<D> {
    type Dispatch = D;

    fn abort<Q>(&mut self, queue: &mut Q, boundary: StampOf<Self>)
    where
        Q: DispatchBuffer<D>,
    {
        queue.remove_at_before(boundary);
    }
}

impl<D: Dispatch> DriverPolicy for Chunk<D> {
    fn dry_capture<Q>(&self, queue: &Q) -> CaptureState
    where
        Q: DispatchBuffer<D>,
    {
        if queue.len() >= self.size {
            CaptureState::Primed
        } else {
            CaptureState::Retry
        }
    }

    fn locate<Q>(&self, queue: &Q) -> Option<CaptureRange<StampOf<Self>>>
    where
        Q: DispatchBuffer<D>,
    {
        if queue.len() < self.size {
            return None;
        }
        let lower = queue.oldest_stamp()?;
        let upper = queue.iter().nth(self.size - 1)?.stamp();
        Some(CaptureRange::new(lower, upper))
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
        let Some(range) = self.locate(queue) else {
            return (CaptureState::Retry, None);
        };

        for _ in 0..self.size {
            if let Some(dispatch) = queue.pop_oldest() {
                sink.append(dispatch);
            }
        }

        (CaptureState::Primed, Some(range))
    }
}
