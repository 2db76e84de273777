//! Non-blocking delay timer.
//!
//! Replaces busy-wait delays with a pollable deadline.  The timer never
//! reads a clock itself: every time-dependent call takes `now_ms` from the
//! caller's [`Clock`](crate::app::ports::Clock), which keeps it usable from
//! any context and trivially testable.
//!
//! ```text
//!            start(d > 0)
//!   ┌──────┐ ───────────▶ ┌───────┐ ──┐ complete() && elapsed && continuous
//!   │ Idle │              │ Armed │   │ (re-armed from `now`)
//!   └──────┘ ◀─────────── └───────┘ ◀─┘
//!     complete() && elapsed && one-shot, or stop()
//! ```
//!
//! All arithmetic is `wrapping_sub` on `u32` milliseconds so the ~49.7 day
//! rollover of the monotonic counter never produces a missed or spurious
//! expiry.

/// Pollable one-shot / repeating deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayTimer {
    start_ms: u32,
    duration_ms: u32,
    continuous: bool,
    running: bool,
}

impl DelayTimer {
    /// Idle, one-shot timer.
    pub const fn new() -> Self {
        Self {
            start_ms: 0,
            duration_ms: 0,
            continuous: false,
            running: false,
        }
    }

    /// Select auto-rearm behaviour for subsequent expiries.  Does not
    /// start or stop the timer.
    pub fn set_mode(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Arm the timer from `now_ms`.  A zero duration leaves the timer
    /// untouched, so it can never report an expiry.
    pub fn start(&mut self, now_ms: u32, duration_ms: u32) {
        if duration_ms == 0 {
            return;
        }
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
        self.running = true;
    }

    /// Disarm and clear the deadline.
    pub fn stop(&mut self) {
        self.start_ms = 0;
        self.duration_ms = 0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Milliseconds until expiry; `0` when idle or already overdue.
    pub fn remaining(&self, now_ms: u32) -> u32 {
        if !self.running {
            return 0;
        }
        self.duration_ms
            .saturating_sub(now_ms.wrapping_sub(self.start_ms))
    }

    /// Duration of the current (or last) countdown.
    pub fn duration(&self) -> u32 {
        self.duration_ms
    }

    /// Poll for expiry.
    ///
    /// Returns `true` exactly once per expiry.  A continuous timer re-arms
    /// from `now_ms` rather than from the missed deadline, so a late poll
    /// shifts the phase of every later expiry.
    pub fn complete(&mut self, now_ms: u32) -> bool {
        if !self.running || now_ms.wrapping_sub(self.start_ms) < self.duration_ms {
            return false;
        }
        if self.continuous {
            self.start(now_ms, self.duration_ms);
        } else {
            self.stop();
        }
        true
    }
}
