//! Group notifier - one wakeup channel shared by a captor group
//!
//! Captors signal the notifier on every inject, abort, and reset, so a
//! group-level blocking capture wakes whenever any stream makes progress,
//! not only the stream whose lock it would otherwise watch.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
struct NotifierState {
    version: u64,
    abort_epoch: u64,
}

/// Counters observed by a waiter before it blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierSnapshot {
    version: u64,
    abort_epoch: u64,
}

/// Outcome of waiting on a [`GroupNotifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitVerdict {
    /// New data arrived somewhere in the group.
    Data,
    /// An abort or reset landed while waiting.
    Aborted,
    /// The deadline passed first.
    TimedOut,
}

/// Shared condition-variable handle for a captor group.
#[derive(Debug, Default)]
pub struct GroupNotifier {
    state: Mutex<NotifierState>,
    readiness: Condvar,
}

impl GroupNotifier {
    /// New notifier with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current counters; pass the snapshot to [`Self::wait_past`].
    pub fn observe(&self) -> NotifierSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        NotifierSnapshot {
            version: state.version,
            abort_epoch: state.abort_epoch,
        }
    }

    /// Signal that data was injected.
    pub fn notify_data(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.version = state.version.wrapping_add(1);
        }
        self.readiness.notify_all();
    }

    /// Signal an abort or reset; waiters observe it as `Aborted`.
    pub fn notify_abort(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.version = state.version.wrapping_add(1);
            state.abort_epoch = state.abort_epoch.wrapping_add(1);
        }
        self.readiness.notify_all();
    }

    /// Block until the counters move past `seen` or `deadline` passes.
    pub fn wait_past(&self, seen: NotifierSnapshot, deadline: Instant) -> WaitVerdict {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if state.abort_epoch != seen.abort_epoch {
                return WaitVerdict::Aborted;
            }
            if state.version != seen.version {
                return WaitVerdict::Data;
            }

            let now = Instant::now();
            if now >= deadline {
                return WaitVerdict::TimedOut;
            }

            let (next, _timeout) = self
                .readiness
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_times_out() {
        let notifier = GroupNotifier::new();
        let seen = notifier.observe();
        let verdict = notifier.wait_past(seen, Instant::now() + Duration::from_millis(10));
        assert_eq!(verdict, WaitVerdict::TimedOut);
    }

    #[test]
    fn test_data_wakes_waiter() {
        let notifier = Arc::new(GroupNotifier::new());
        let seen = notifier.observe();

        let signaler = Arc::clone(&notifier);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            signaler.notify_data();
        });

        let verdict = notifier.wait_past(seen, Instant::now() + Duration::from_secs(5));
        assert_eq!(verdict, WaitVerdict::Data);
        handle.join().unwrap();
    }

    #[test]
    fn test_abort_beats_data() {
        let notifier = GroupNotifier::new();
        let seen = notifier.observe();
        notifier.notify_data();
        notifier.notify_abort();
        let verdict = notifier.wait_past(seen, Instant::now() + Duration::from_secs(1));
        assert_eq!(verdict, WaitVerdict::Aborted);
    }

    #[test]
    fn test_stale_snapshot_returns_immediately() {
        let notifier = GroupNotifier::new();
        let seen = notifier.observe();
        notifier.notify_data();
        let verdict = notifier.wait_past(seen, Instant::now() + Duration::from_secs(5));
        assert_eq!(verdict, WaitVerdict::Data);
    }
}
