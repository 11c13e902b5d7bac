//! Captor - one stream's buffer-plus-policy unit
//!
//! A captor owns a capture queue, a policy, and a lock policy. The caller
//! owns the captor; the synchronizer borrows it for the duration of a group
//! capture call. [`PollingCaptor`] is the single-threaded variant,
//! [`BlockingCaptor`] the mutexed one whose blocking captures wait on a
//! condition variable.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use contracts::{CaptureRange, CaptureSink, CaptureState, SequencingStamp};

use crate::lock::{LockPolicy, Mutexed, Unlocked};
use crate::notifier::GroupNotifier;
use crate::policy::{CapturePolicy, DispatchOf, DriverPolicy, FollowerPolicy, StampOf};
use crate::queue::{CaptureQueue, DispatchBuffer};

/// Queue, policy, and cancellation epoch behind a captor's lock.
#[derive(Debug)]
pub struct CaptorCore<P, Q = CaptureQueue<DispatchOf<P>>>
where
    P: CapturePolicy,
{
    queue: Q,
    policy: P,
    epoch: u64,
}

impl<P, Q> CaptorCore<P, Q>
where
    P: CapturePolicy,
    Q: DispatchBuffer<P::Dispatch>,
{
    /// Bundle a policy with its queue.
    pub fn new(policy: P, queue: Q) -> Self {
        Self {
            queue,
            policy,
            epoch: 0,
        }
    }

    /// Insert one dispatch at its stamp-ordered position.
    pub fn inject(&mut self, dispatch: P::Dispatch) {
        self.queue.insert(dispatch);
    }

    /// Apply the policy's abort boundary and invalidate waiters.
    pub fn abort(&mut self, boundary: StampOf<P>) {
        self.policy.abort(&mut self.queue, boundary);
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Drop all queued elements and auxiliary policy state.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.policy.reset();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Borrow queue and policy together for a capture step.
    pub fn split(&mut self) -> (&mut Q, &mut P) {
        (&mut self.queue, &mut self.policy)
    }

    /// Borrow the queue.
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Cancellation epoch; bumped on every abort and reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Per-stream captor, generic over policy, storage, and lock policy.
#[derive(Debug)]
pub struct Captor<P, Q = CaptureQueue<DispatchOf<P>>, L = Unlocked<CaptorCore<P, Q>>>
where
    P: CapturePolicy,
{
    lock: L,
    notifier: Option<Arc<GroupNotifier>>,
    _marker: PhantomData<fn() -> (P, Q)>,
}

/// Single-threaded captor: no synchronization, `!Sync` by construction.
pub type PollingCaptor<P> = Captor<P>;

/// Multi-threaded captor: mutex-guarded state, condition-variable wakeups.
pub type BlockingCaptor<P> =
    Captor<P, CaptureQueue<DispatchOf<P>>, Mutexed<CaptorCore<P, CaptureQueue<DispatchOf<P>>>>>;

impl<P, Q, L> Captor<P, Q, L>
where
    P: CapturePolicy,
    Q: DispatchBuffer<P::Dispatch>,
    L: LockPolicy<CaptorCore<P, Q>>,
{
    /// Captor with an empty default queue.
    pub fn new(policy: P) -> Self {
        Self::with_queue(policy, Q::default())
    }

    /// Captor over a caller-supplied queue (bounded, ring-backed, ...).
    pub fn with_queue(policy: P, queue: Q) -> Self {
        Self {
            lock: L::new(CaptorCore::new(policy, queue)),
            notifier: None,
            _marker: PhantomData,
        }
    }

    /// Attach the group notifier this captor signals on inject/abort/reset.
    pub fn with_notifier(mut self, notifier: Arc<GroupNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Feed one dispatch in. The only mutating entry point that may run
    /// concurrently with a blocking capture on the mutexed variant.
    pub fn inject(&self, dispatch: P::Dispatch) {
        self.lock.with(|core| core.inject(dispatch));
        self.lock.notify_all();
        if let Some(notifier) = &self.notifier {
            notifier.notify_data();
        }
    }

    /// Feed a batch of dispatches under one lock acquisition.
    pub fn inject_range<I>(&self, dispatches: I)
    where
        I: IntoIterator<Item = P::Dispatch>,
    {
        self.lock.with(|core| {
            for dispatch in dispatches {
                core.inject(dispatch);
            }
        });
        self.lock.notify_all();
        if let Some(notifier) = &self.notifier {
            notifier.notify_data();
        }
    }

    /// Retire elements up to the policy's interpretation of `boundary` and
    /// wake any waiter with `Abort`.
    pub fn abort(&self, boundary: StampOf<P>) {
        self.lock.with(|core| core.abort(boundary));
        self.lock.notify_all();
        if let Some(notifier) = &self.notifier {
            notifier.notify_abort();
        }
    }

    /// Clear queue and policy state; waiters observe `Abort`.
    pub fn reset(&self) {
        self.lock.with(|core| core.reset());
        self.lock.notify_all();
        if let Some(notifier) = &self.notifier {
            notifier.notify_abort();
        }
    }

    /// Number of buffered elements.
    pub fn len(&self) -> usize {
        self.lock.with(|core| core.queue().len())
    }

    /// True when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.lock.with(|core| core.queue().is_empty())
    }

    /// Queue capacity bound, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.lock.with(|core| core.queue().capacity())
    }

    /// Stamps currently buffered, oldest first. Diagnostics helper.
    pub fn buffered_stamps(&self) -> Vec<StampOf<P>> {
        self.lock.with(|core| crate::queue::stamps(core.queue()))
    }
}

impl<P, L> Captor<P, CaptureQueue<DispatchOf<P>>, L>
where
    P: CapturePolicy,
    L: LockPolicy<CaptorCore<P, CaptureQueue<DispatchOf<P>>>>,
{
    /// Captor whose queue holds at most `capacity` elements; over-capacity
    /// inserts silently drop the oldest element.
    pub fn bounded(policy: P, capacity: usize) -> Self {
        Self::with_queue(policy, CaptureQueue::bounded(capacity))
    }
}

/// Read-only and control surface of a driver captor.
///
/// Everything the synchronizer needs for the dry phase and the group-level
/// abort/reset broadcasts; no sink type involved.
pub trait DriverProbe {
    /// Stamp type shared by the group.
    type Stamp: SequencingStamp;

    /// Readiness without mutation.
    fn dry_capture(&self) -> CaptureState;

    /// Candidate range for the next capture, without mutation.
    fn locate(&self) -> Option<CaptureRange<Self::Stamp>>;

    /// Group-level abort entry.
    fn abort_at(&self, boundary: Self::Stamp);

    /// Group-level reset entry.
    fn reset_captor(&self);
}

/// Capture surface of a driver captor emitting into sinks of type `K`.
pub trait DriverHandle<K>: DriverProbe {
    /// Emit into `sink`, retire per policy, and report the driving range.
    fn capture(&self, sink: &mut K) -> (CaptureState, Option<CaptureRange<Self::Stamp>>);

    /// Block until the dry check leaves `Retry`, then capture. Returns
    /// `Timeout` past the deadline and `Abort` when cancelled mid-wait.
    fn capture_until(
        &self,
        sink: &mut K,
        deadline: Instant,
    ) -> (CaptureState, Option<CaptureRange<Self::Stamp>>);
}

/// Read-only and control surface of a follower captor.
pub trait FollowerProbe {
    /// Stamp type shared by the group.
    type Stamp: SequencingStamp;

    /// Readiness against `range`, without mutation.
    fn dry_capture(&self, range: &CaptureRange<Self::Stamp>) -> CaptureState;

    /// Group-level abort entry.
    fn abort_at(&self, boundary: Self::Stamp);

    /// Group-level reset entry.
    fn reset_captor(&self);
}

/// Capture surface of a follower captor emitting into sinks of type `K`.
pub trait FollowerHandle<K>: FollowerProbe {
    /// Emit the selection for `range` into `sink` and retire per policy.
    fn capture(&self, sink: &mut K, range: &CaptureRange<Self::Stamp>) -> CaptureState;

    /// Block until the dry check against `range` leaves `Retry`, then
    /// capture.
    fn capture_until(
        &self,
        sink: &mut K,
        range: &CaptureRange<Self::Stamp>,
        deadline: Instant,
    ) -> CaptureState;
}

impl<P, Q, L> DriverProbe for Captor<P, Q, L>
where
    P: DriverPolicy,
    Q: DispatchBuffer<P::Dispatch>,
    L: LockPolicy<CaptorCore<P, Q>>,
{
    type Stamp = StampOf<P>;

    fn dry_capture(&self) -> CaptureState {
        self.lock.with(|core| {
            let (queue, policy) = core.split();
            policy.dry_capture(queue)
        })
    }

    fn locate(&self) -> Option<CaptureRange<Self::Stamp>> {
        self.lock.with(|core| {
            let (queue, policy) = core.split();
            policy.locate(queue)
        })
    }

    fn abort_at(&self, boundary: Self::Stamp) {
        self.abort(boundary);
    }

    fn reset_captor(&self) {
        self.reset();
    }
}

impl<P, Q, L, K> DriverHandle<K> for Captor<P, Q, L>
where
    P: DriverPolicy,
    Q: DispatchBuffer<P::Dispatch>,
    L: LockPolicy<CaptorCore<P, Q>>,
    K: CaptureSink<P::Dispatch>,
{
    fn capture(&self, sink: &mut K) -> (CaptureState, Option<CaptureRange<Self::Stamp>>) {
        self.lock.with(|core| {
            let (queue, policy) = core.split();
            policy.capture(queue, sink)
        })
    }

    fn capture_until(
        &self,
        sink: &mut K,
        deadline: Instant,
    ) -> (CaptureState, Option<CaptureRange<Self::Stamp>>) {
        let start = self.lock.with(|core| core.epoch());
        self.lock
            .wait_until(deadline, |core| {
                if core.epoch() != start {
                    return Some((CaptureState::Abort, None));
                }
                let (queue, policy) = core.split();
                match policy.dry_capture(queue) {
                    CaptureState::Retry => None,
                    _ => Some(policy.capture(queue, sink)),
                }
            })
            .unwrap_or((CaptureState::Timeout, None))
    }
}

impl<P, Q, L> FollowerProbe for Captor<P, Q, L>
where
    P: FollowerPolicy,
    Q: DispatchBuffer<P::Dispatch>,
    L: LockPolicy<CaptorCore<P, Q>>,
{
    type Stamp = StampOf<P>;

    fn dry_capture(&self, range: &CaptureRange<Self::Stamp>) -> CaptureState {
        self.lock.with(|core| {
            let (queue, policy) = core.split();
            policy.dry_capture(queue, range)
        })
    }

    fn abort_at(&self, boundary: Self::Stamp) {
        self.abort(boundary);
    }

    fn reset_captor(&self) {
        self.reset();
    }
}

impl<P, Q, L, K> FollowerHandle<K> for Captor<P, Q, L>
where
    P: FollowerPolicy,
    Q: DispatchBuffer<P::Dispatch>,
    L: LockPolicy<CaptorCore<P, Q>>,
    K: CaptureSink<P::Dispatch>,
{
    fn capture(&self, sink: &mut K, range: &CaptureRange<Self::Stamp>) -> CaptureState {
        self.lock.with(|core| {
            let (queue, policy) = core.split();
            policy.capture(queue, sink, range)
        })
    }

    fn capture_until(
        &self,
        sink: &mut K,
        range: &CaptureRange<Self::Stamp>,
        deadline: Instant,
    ) -> CaptureState {
        let start = self.lock.with(|core| core.epoch());
        self.lock
            .wait_until(deadline, |core| {
                if core.epoch() != start {
                    return Some(CaptureState::Abort);
                }
                let (queue, policy) = core.split();
                match policy.dry_capture(queue, range) {
                    CaptureState::Retry => None,
                    _ => Some(policy.capture(queue, sink, range)),
                }
            })
            .unwrap_or(CaptureState::Timeout)
    }
}

impl<T: DriverProbe> DriverProbe for &T {
    type Stamp = T::Stamp;

    fn dry_capture(&self) -> CaptureState {
        (**self).dry_capture()
    }

    fn locate(&self) -> Option<CaptureRange<T::Stamp>> {
        (**self).locate()
    }

    fn abort_at(&self, boundary: T::Stamp) {
        (**self).abort_at(boundary)
    }

    fn reset_captor(&self) {
        (**self).reset_captor()
    }
}

impl<T: DriverHandle<K>, K> DriverHandle<K> for &T {
    fn capture(&self, sink: &mut K) -> (CaptureState, Option<CaptureRange<T::Stamp>>) {
        (**self).capture(sink)
    }

    fn capture_until(
        &self,
        sink: &mut K,
        deadline: Instant,
    ) -> (CaptureState, Option<CaptureRange<T::Stamp>>) {
        (**self).capture_until(sink, deadline)
    }
}

impl<T: FollowerProbe> FollowerProbe for &T {
    type Stamp = T::Stamp;

    fn dry_capture(&self, range: &CaptureRange<T::Stamp>) -> CaptureState {
        (**self).dry_capture(range)
    }

    fn abort_at(&self, boundary: T::Stamp) {
        (**self).abort_at(boundary)
    }

    fn reset_captor(&self) {
        (**self).reset_captor()
    }
}

impl<T: FollowerHandle<K>, K> FollowerHandle<K> for &T {
    fn capture(&self, sink: &mut K, range: &CaptureRange<T::Stamp>) -> CaptureState {
        (**self).capture(sink, range)
    }

    fn capture_until(
        &self,
        sink: &mut K,
        range: &CaptureRange<T::Stamp>,
        deadline: Instant,
    ) -> CaptureState {
        (**self).capture_until(sink, range, deadline)
    }
}

impl<T: DriverProbe> DriverProbe for Arc<T> {
    type Stamp = T::Stamp;

    fn dry_capture(&self) -> CaptureState {
        (**self).dry_capture()
    }

    fn locate(&self) -> Option<CaptureRange<T::Stamp>> {
        (**self).locate()
    }

    fn abort_at(&self, boundary: T::Stamp) {
        (**self).abort_at(boundary)
    }

    fn reset_captor(&self) {
        (**self).reset_captor()
    }
}

impl<T: DriverHandle<K>, K> DriverHandle<K> for Arc<T> {
    fn capture(&self, sink: &mut K) -> (CaptureState, Option<CaptureRange<T::Stamp>>) {
        (**self).capture(sink)
    }

    fn capture_until(
        &self,
        sink: &mut K,
        deadline: Instant,
    ) -> (CaptureState, Option<CaptureRange<T::Stamp>>) {
        (**self).capture_until(sink, deadline)
    }
}

impl<T: FollowerProbe> FollowerProbe for Arc<T> {
    type Stamp = T::Stamp;

    fn dry_capture(&self, range: &CaptureRange<T::Stamp>) -> CaptureState {
        (**self).dry_capture(range)
    }

    fn abort_at(&self, boundary: T::Stamp) {
        (**self).abort_at(boundary)
    }

    fn reset_captor(&self) {
        (**self).reset_captor()
    }
}

impl<T: FollowerHandle<K>, K> FollowerHandle<K> for Arc<T> {
    fn capture(&self, sink: &mut K, range: &CaptureRange<T::Stamp>) -> CaptureState {
        (**self).capture(sink, range)
    }

    fn capture_until(
        &self,
        sink: &mut K,
        range: &CaptureRange<T::Stamp>,
        deadline: Instant,
    ) -> CaptureState {
        (**self).capture_until(sink, range, deadline)
    }
}
