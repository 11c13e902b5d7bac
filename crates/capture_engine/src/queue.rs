//! Capture queue - per-stream ordered buffer
//!
//! Dispatches are stored in non-decreasing stamp order. Sorted input inserts
//! at the back in O(1); out-of-order arrivals pay a positional insert. Prefix
//! removal is O(k) in the number of elements retired.

use std::collections::VecDeque;

use contracts::Dispatch;

/// Ordered dispatch storage behind a captor.
///
/// The default implementation is [`CaptureQueue`]; ring-buffer or
/// arena-backed stores can be swapped in by implementing this trait.
pub trait DispatchBuffer<D: Dispatch>: Default {
    /// Insert at the stamp-ordered position, evicting the oldest element
    /// first when the buffer is bounded and full.
    fn insert(&mut self, dispatch: D);

    /// Stamp of the oldest element.
    fn oldest_stamp(&self) -> Option<D::Stamp>;

    /// Stamp of the newest element.
    fn newest_stamp(&self) -> Option<D::Stamp>;

    /// Remove and return the oldest element.
    fn pop_oldest(&mut self) -> Option<D>;

    /// Retire every element with `stamp < boundary`.
    fn remove_before(&mut self, boundary: D::Stamp);

    /// Retire every element with `stamp <= boundary`.
    fn remove_at_before(&mut self, boundary: D::Stamp);

    /// Number of buffered elements.
    fn len(&self) -> usize;

    /// True when nothing is buffered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all elements.
    fn clear(&mut self);

    /// Capacity bound, if any.
    fn capacity(&self) -> Option<usize> {
        None
    }

    /// Iterate oldest to newest.
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a D> + 'a
    where
        D: 'a;
}

/// Deque-backed capture queue with an optional capacity bound.
#[derive(Debug, Clone)]
pub struct CaptureQueue<D> {
    items: VecDeque<D>,
    capacity: Option<usize>,
}

impl<D> Default for CaptureQueue<D> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            capacity: None,
        }
    }
}

impl<D: Dispatch> CaptureQueue<D> {
    /// Unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that holds at most `capacity` elements; over-capacity inserts
    /// drop the oldest element before the new one goes in.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }
}

impl<D: Dispatch> DispatchBuffer<D> for CaptureQueue<D> {
    fn insert(&mut self, dispatch: D) {
        if let Some(capacity) = self.capacity {
            if self.items.len() >= capacity {
                self.items.pop_front();
            }
        }

        let stamp = dispatch.stamp();
        match self.items.back() {
            // Hot path: sorted input appends at the back. Equal stamps keep
            // insertion order.
            Some(newest) if newest.stamp() > stamp => {
                let slot = self.items.partition_point(|d| d.stamp() <= stamp);
                self.items.insert(slot, dispatch);
            }
            _ => self.items.push_back(dispatch),
        }
    }

    fn oldest_stamp(&self) -> Option<D::Stamp> {
        self.items.front().map(Dispatch::stamp)
    }

    fn newest_stamp(&self) -> Option<D::Stamp> {
        self.items.back().map(Dispatch::stamp)
    }

    fn pop_oldest(&mut self) -> Option<D> {
        self.items.pop_front()
    }

    fn remove_before(&mut self, boundary: D::Stamp) {
        while self.items.front().is_some_and(|d| d.stamp() < boundary) {
            self.items.pop_front();
        }
    }

    fn remove_at_before(&mut self, boundary: D::Stamp) {
        while self.items.front().is_some_and(|d| d.stamp() <= boundary) {
            self.items.pop_front();
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a D> + 'a
    where
        D: 'a,
    {
        self.items.iter()
    }
}

/// Stamps currently buffered, oldest first. Test and diagnostics helper.
pub fn stamps<D, Q>(queue: &Q) -> Vec<D::Stamp>
where
    D: Dispatch,
    Q: DispatchBuffer<D>,
{
    queue.iter().map(Dispatch::stamp).collect()
}
