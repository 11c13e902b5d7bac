//! Lock policy - the concurrency wrapper around a captor core
//!
//! Two interchangeable variants expose the same surface: [`Unlocked`] for
//! single-threaded polling (a `RefCell`, `!Sync`, no synchronization cost)
//! and [`Mutexed`] for multi-threaded use (`Mutex` + `Condvar`, deadline
//! waits, wakeups on every notify).

use std::cell::RefCell;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Concurrency wrapper over captor state.
pub trait LockPolicy<T> {
    /// Wrap the initial state.
    fn new(inner: T) -> Self;

    /// Run `f` with exclusive access to the state.
    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;

    /// Wake all threads blocked in [`LockPolicy::wait_until`].
    fn notify_all(&self);

    /// Evaluate `eval` until it yields a result or `deadline` passes.
    /// Returns `None` on timeout. The unlocked variant degrades to a single
    /// evaluation; the mutexed variant re-evaluates on every notify.
    fn wait_until<R>(
        &self,
        deadline: Instant,
        eval: impl FnMut(&mut T) -> Option<R>,
    ) -> Option<R>;
}

/// Single-threaded lock policy. `!Sync`, so sharing across threads is
/// rejected at compile time.
#[derive(Debug)]
pub struct Unlocked<T> {
    cell: RefCell<T>,
}

impl<T> LockPolicy<T> for Unlocked<T> {
    fn new(inner: T) -> Self {
        Self {
            cell: RefCell::new(inner),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    fn notify_all(&self) {}

    fn wait_until<R>(
        &self,
        _deadline: Instant,
        mut eval: impl FnMut(&mut T) -> Option<R>,
    ) -> Option<R> {
        eval(&mut self.cell.borrow_mut())
    }
}

/// Mutex-and-condvar lock policy for multi-threaded captors.
#[derive(Debug)]
pub struct Mutexed<T> {
    inner: Mutex<T>,
    readiness: Condvar,
}

impl<T> Mutexed<T> {
    fn guard(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> LockPolicy<T> for Mutexed<T> {
    fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(inner),
            readiness: Condvar::new(),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.guard())
    }

    fn notify_all(&self) {
        self.readiness.notify_all();
    }

    fn wait_until<R>(
        &self,
        deadline: Instant,
        mut eval: impl FnMut(&mut T) -> Option<R>,
    ) -> Option<R> {
        let mut guard = self.guard();
        loop {
            if let Some(result) = eval(&mut guard) {
                return Some(result);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let (next, timeout) = self
                .readiness
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            guard = next;

            if timeout.timed_out() {
                // Final evaluation so data that raced the deadline still wins.
                return eval(&mut guard);
            }
        }
    }
}
