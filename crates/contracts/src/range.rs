//! CaptureRange - the stamp window a driver hands to its followers

use crate::SequencingStamp;

/// Closed stamp window `[lower, upper]` produced by the driver captor and
/// consumed by every follower in the same capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRange<S> {
    /// Stamp of the earliest driving element.
    pub lower: S,
    /// Stamp of the latest driving element.
    pub upper: S,
}

impl<S: SequencingStamp> CaptureRange<S> {
    /// Build a range; `lower` must not exceed `upper`.
    pub fn new(lower: S, upper: S) -> Self {
        debug_assert!(lower <= upper, "capture range inverted: {lower:?} > {upper:?}");
        Self { lower, upper }
    }

    /// Degenerate single-stamp range `[s, s]`.
    pub fn at(stamp: S) -> Self {
        Self { lower: stamp, upper: stamp }
    }

    /// True when `stamp` falls inside the closed window.
    pub fn contains(&self, stamp: S) -> bool {
        self.lower <= stamp && stamp <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_closed() {
        let r = CaptureRange::new(3i64, 7);
        assert!(r.contains(3));
        assert!(r.contains(7));
        assert!(!r.contains(8));
        assert!(!r.contains(2));
    }

    #[test]
    fn test_at() {
        let r = CaptureRange::at(5i64);
        assert_eq!(r.lower, r.upper);
    }
}
