//! CaptureState - protocol result states
//!
//! Non-success states are part of the capture protocol, not errors; callers
//! are expected to branch on them.

/// Result of a capture or dry-capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Output produced (or producible, for a dry check).
    Primed,
    /// More data is needed; the buffer is retained untouched.
    Retry,
    /// The driving sequence has advanced past the point where this captor
    /// could ever satisfy its rule; state is dropped and capture resumes.
    Abort,
    /// A blocking wait exceeded its deadline.
    Timeout,
}

impl CaptureState {
    /// Group reduction: `Abort` dominates, then `Timeout`, then `Retry`;
    /// `Primed` only survives when every operand is `Primed`.
    pub fn combine(self, other: CaptureState) -> CaptureState {
        use CaptureState::*;
        match (self, other) {
            (Abort, _) | (_, Abort) => Abort,
            (Timeout, _) | (_, Timeout) => Timeout,
            (Retry, _) | (_, Retry) => Retry,
            (Primed, Primed) => Primed,
        }
    }

    /// True for `Primed`.
    pub fn is_primed(self) -> bool {
        matches!(self, CaptureState::Primed)
    }

    /// Static label for logging and metric tags.
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureState::Primed => "primed",
            CaptureState::Retry => "retry",
            CaptureState::Abort => "abort",
            CaptureState::Timeout => "timeout",
        }
    }
}
