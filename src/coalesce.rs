//! Trailing-edge coalescing for rapid slider input.
//!
//! DESIGN
//! ======
//! Slider drags fire an input event per pixel of travel. Values are stored as
//! they arrive, but the color recomputation is deferred: the first change opens
//! a window, later changes inside it only bump a counter, and the host's
//! `tick` performs one recomputation once the window has elapsed. A burst
//! therefore costs one recomputation, at the price of up to one window of
//! latency.
//!
//! Every time-dependent method has an `_at` twin taking an explicit `Instant`
//! so tests can drive the clock.

#[cfg(test)]
#[path = "coalesce_test.rs"]
mod coalesce_test;

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Coalescer {
    window: Duration,
    /// When the first change of the current burst arrived.
    pending_since: Option<Instant>,
    /// Changes folded into the current burst.
    coalesced: usize,
}

impl Coalescer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, pending_since: None, coalesced: 0 }
    }

    /// Record a change now.
    pub fn mark(&mut self) {
        self.mark_at(Instant::now());
    }

    /// Record a change at `now`. Opens a window if none is pending.
    pub fn mark_at(&mut self, now: Instant) {
        if self.pending_since.is_none() {
            self.pending_since = Some(now);
        }
        self.coalesced += 1;
    }

    /// Whether a recomputation is owed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// When the pending recomputation becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|t| t + self.window)
    }

    /// Take the pending burst if its window has elapsed at `now`. Returns the
    /// number of changes it folded.
    pub fn take_due_at(&mut self, now: Instant) -> Option<usize> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.window {
            return None;
        }
        self.take()
    }

    /// Take the pending burst regardless of the window.
    pub fn take(&mut self) -> Option<usize> {
        self.pending_since.take()?;
        Some(std::mem::take(&mut self.coalesced))
    }
}
