//! A countdown timer.

use serde::{Deserialize, Serialize};

/// Counts down from a fixed duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    duration: f32,
    remaining: f32,
}

impl Timer {
    /// Creates a timer that expires after `duration` seconds.
    ///
    /// Negative or non-finite durations produce an already expired timer.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Removes `delta` seconds from the remaining time.
    pub fn tick(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.remaining = (self.remaining - delta).max(0.0);
        }
    }

    /// Returns `true` once the full duration has elapsed.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Fraction of the duration already elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        1.0 - self.remaining / self.duration
    }

    /// Restarts the countdown.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }
}
