//! Consecutive wrong-password counter.

/// Failure counter bounded to `[0, threshold)`.
///
/// Reaching the threshold is reported once by [`record_failure`]; the
/// counter then stays at the threshold until the caller finishes the alarm
/// cycle and calls [`reset`].
///
/// [`record_failure`]: LockoutState::record_failure
/// [`reset`]: LockoutState::reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    failures: u8,
    threshold: u8,
}

impl LockoutState {
    pub fn new(threshold: u8) -> Self {
        Self {
            failures: 0,
            threshold: threshold.max(1),
        }
    }

    /// Count one wrong password.  Returns `true` when the threshold is hit.
    pub fn record_failure(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1).min(self.threshold);
        self.failures >= self.threshold
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u8 {
        self.failures
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}
