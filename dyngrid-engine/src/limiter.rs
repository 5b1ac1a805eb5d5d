//! FILENAME: dyngrid-engine/src/limiter.rs
//! PURPOSE: Coalesces high-frequency triggers into at most one execution per interval.
//! CONTEXT: Scroll events arrive far faster than the visible window can be
//! recomputed. The limiter runs the first trigger immediately, then holds the
//! latest argument of every trigger that lands inside the cooldown and
//! releases it once when the interval elapses.
//!
//! The limiter is a cooperative timer: it never spawns threads or sleeps.
//! Callers pass `now` into `trigger()` and `poll()`, which keeps it usable from
//! any event loop and deterministic under test.

use std::time::{Duration, Instant};

/// Interval used for scroll triggers when the settings do not override it.
pub const DEFAULT_SCROLL_INTERVAL_MS: u64 = 150;

#[derive(Debug, Clone)]
pub struct EventLimiter<T> {
    interval: Duration,

    /// Start of the current cooldown window. `None` when not limiting.
    limiting_since: Option<Instant>,

    /// Argument of the latest trigger seen during the cooldown.
    pending: Option<T>,
}

impl<T> EventLimiter<T> {
    pub fn new(interval: Duration) -> Self {
        EventLimiter {
            interval,
            limiting_since: None,
            pending: None,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        EventLimiter::new(Duration::from_millis(interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a cooldown window is currently open.
    pub fn is_limiting(&self) -> bool {
        self.limiting_since.is_some()
    }

    /// Whether a deferred invocation is waiting for the interval to elapse.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the open cooldown window ends, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.limiting_since.map(|since| since + self.interval)
    }

    /// Registers a trigger.
    ///
    /// Returns `Some(arg)` when the action should run right now. Otherwise the
    /// argument replaces any previously pending one and `None` is returned.
    pub fn trigger(&mut self, arg: T, now: Instant) -> Option<T> {
        if self.is_limiting() {
            self.pending = Some(arg);
            return None;
        }

        self.limiting_since = Some(now);
        Some(arg)
    }

    /// Timer tick.
    ///
    /// Once the cooldown has elapsed, returns the pending argument (if any).
    /// Releasing a pending argument opens a fresh cooldown so two executions
    /// are never closer together than the interval; with nothing pending the
    /// limiter goes idle and the next trigger runs immediately.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }

        match self.pending.take() {
            Some(arg) => {
                self.limiting_since = Some(now);
                Some(arg)
            }
            None => {
                self.limiting_since = None;
                None
            }
        }
    }

    /// Drops any pending argument and ends the cooldown.
    pub fn reset(&mut self) {
        self.limiting_since = None;
        self.pending = None;
    }
}

impl<T> Default for EventLimiter<T> {
    fn default() -> Self {
        EventLimiter::from_millis(DEFAULT_SCROLL_INTERVAL_MS)
    }
}
