//! Consumer-side rate limiting.
//!
//! Some consumers must run no faster than their own cadence regardless
//! of how often the scheduler calls them (the dissolved-oxygen controller
//! is registered at 100 ms but only acts once per second).  A
//! [`RateGate`] lets such a callback skip the excess invocations without
//! touching the scheduler.

use crate::timer::DelayTimer;

/// Lets at most one invocation through per period.
#[derive(Debug, Clone, Copy)]
pub struct RateGate {
    period_ms: u32,
    timer: DelayTimer,
    primed: bool,
    passed: u32,
    skipped: u32,
}

impl RateGate {
    /// Gate with the given period.  A zero period never gates.
    pub fn new(period_ms: u32) -> Self {
        let mut timer = DelayTimer::new();
        timer.set_mode(true);
        Self {
            period_ms,
            timer,
            primed: false,
            passed: 0,
            skipped: 0,
        }
    }

    /// Whether the caller may act now.  The first call always passes and
    /// starts the period.
    pub fn ready(&mut self, now_ms: u32) -> bool {
        let open = if self.period_ms == 0 {
            true
        } else if !self.primed {
            self.primed = true;
            self.timer.start(now_ms, self.period_ms);
            true
        } else {
            self.timer.complete(now_ms)
        };

        if open {
            self.passed = self.passed.wrapping_add(1);
        } else {
            self.skipped = self.skipped.wrapping_add(1);
        }
        open
    }

    /// Re-open the gate; the next call passes.
    pub fn reset(&mut self) {
        self.timer.stop();
        self.primed = false;
    }

    pub fn period(&self) -> u32 {
        self.period_ms
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}
