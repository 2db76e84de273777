//! A single scheduled task and its execution statistics.
//!
//! A [`ScheduledTask`] couples a callback to a cadence (an embedded
//! [`DelayTimer`]) and records how long each invocation took.  Tasks are
//! created and owned by the [`Scheduler`](super::Scheduler); callers reach
//! them through a [`TaskId`](super::TaskId).
//!
//! ## CPU usage accounting
//!
//! Each task keeps a rolling window of busy time.  When an execution
//! starts more than `window_ms` after the window opened, the window is
//! restarted at that execution.  Usage is busy time over wall time since
//! the window opened, so a single invocation can briefly read well above
//! the long-run duty cycle, and an overloaded task reads above 100 %.

use crate::app::ports::Clock;
use crate::timer::DelayTimer;

/// Callback bound to a task.  Must not block.
pub type TaskCallback = Box<dyn FnMut()>;

/// Execution-time statistics (microseconds) and the rolling usage window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecStats {
    last_us: u32,
    min_us: u32,
    max_us: u32,
    total_us: u64,
    count: u32,
    window_ms: u32,
    window_start_ms: u32,
    window_busy_us: u64,
}

impl ExecStats {
    /// Sentinel for `min_us` before the first sample.
    const NO_SAMPLE: u32 = u32::MAX;

    fn new(window_ms: u32, now_ms: u32) -> Self {
        Self {
            last_us: 0,
            min_us: Self::NO_SAMPLE,
            max_us: 0,
            total_us: 0,
            count: 0,
            window_ms,
            window_start_ms: now_ms,
            window_busy_us: 0,
        }
    }

    fn record(&mut self, duration_us: u32, started_ms: u32) {
        self.last_us = duration_us;
        self.min_us = self.min_us.min(duration_us);
        self.max_us = self.max_us.max(duration_us);
        self.total_us = self.total_us.saturating_add(u64::from(duration_us));
        self.count = self.count.saturating_add(1);

        if started_ms.wrapping_sub(self.window_start_ms) > self.window_ms {
            self.window_start_ms = started_ms;
            self.window_busy_us = u64::from(duration_us);
        } else {
            self.window_busy_us = self.window_busy_us.saturating_add(u64::from(duration_us));
        }
    }

    pub fn last_us(&self) -> u32 {
        self.last_us
    }

    /// Shortest recorded execution; `None` before the first sample.
    pub fn min_us(&self) -> Option<u32> {
        (self.count > 0).then_some(self.min_us)
    }

    pub fn max_us(&self) -> u32 {
        self.max_us
    }

    pub fn total_us(&self) -> u64 {
        self.total_us
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean execution time; `0.0` before the first sample.
    pub fn average_us(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.total_us as f64 / f64::from(self.count)) as f32
    }

    /// Busy time in the current window as a percentage of the wall time
    /// since the window opened.  Unclamped.
    pub fn cpu_usage_percent(&self, now_ms: u32) -> f32 {
        let elapsed_ms = now_ms.wrapping_sub(self.window_start_ms);
        if elapsed_ms == 0 {
            return 0.0;
        }
        (self.window_busy_us as f64 * 100.0 / (f64::from(elapsed_ms) * 1000.0)) as f32
    }

    pub fn window_start_ms(&self) -> u32 {
        self.window_start_ms
    }

    pub fn window_busy_us(&self) -> u64 {
        self.window_busy_us
    }
}

/// A callback with a cadence, a priority class and runtime statistics.
pub struct ScheduledTask {
    label: &'static str,
    callback: TaskCallback,
    interval_ms: u32,
    repeat: bool,
    paused: bool,
    high_priority: bool,
    timer: DelayTimer,
    stats: ExecStats,
}

impl ScheduledTask {
    pub(crate) fn new(
        label: &'static str,
        callback: TaskCallback,
        interval_ms: u32,
        repeat: bool,
        high_priority: bool,
        now_ms: u32,
        window_ms: u32,
    ) -> Self {
        let mut timer = DelayTimer::new();
        timer.set_mode(repeat);
        timer.start(now_ms, interval_ms);

        Self {
            label,
            callback,
            interval_ms,
            repeat,
            paused: false,
            high_priority,
            timer,
            stats: ExecStats::new(window_ms, now_ms),
        }
    }

    /// Poll the timer and run the callback if due.  Returns whether the
    /// callback ran.
    ///
    /// A paused task does not poll its timer at all, so an expiry that
    /// falls inside the pause is delivered on the first pass after
    /// `resume()`.
    pub(crate) fn update<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        if self.paused {
            return false;
        }
        let now_ms = clock.now_ms();
        if !self.timer.complete(now_ms) {
            return false;
        }

        // A period changed via set_interval() takes effect at this re-arm.
        if self.repeat && self.timer.duration() != self.interval_ms {
            if self.interval_ms == 0 {
                self.timer.stop();
            } else {
                self.timer.start(now_ms, self.interval_ms);
            }
        }

        let before_us = clock.now_us();
        (self.callback)();
        let after_us = clock.now_us();

        self.stats.record(after_us.wrapping_sub(before_us), now_ms);
        true
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_high_priority(&self) -> bool {
        self.high_priority
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// `true` once the task can never fire again: a finished one-shot, or
    /// a task registered (or re-armed) with a zero interval.
    pub fn is_inert(&self) -> bool {
        !self.timer.is_running()
    }

    /// Change the period.  The countdown in progress is left alone; the
    /// new value is used from the next re-arm.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    pub fn interval(&self) -> u32 {
        self.interval_ms
    }

    /// Milliseconds until the next firing; `0` when due or inert.
    pub fn remaining(&self, now_ms: u32) -> u32 {
        self.timer.remaining(now_ms)
    }

    pub fn stats(&self) -> &ExecStats {
        &self.stats
    }

    pub fn last_exec_us(&self) -> u32 {
        self.stats.last_us()
    }

    pub fn min_exec_us(&self) -> Option<u32> {
        self.stats.min_us()
    }

    pub fn max_exec_us(&self) -> u32 {
        self.stats.max_us()
    }

    pub fn average_exec_us(&self) -> f32 {
        self.stats.average_us()
    }

    pub fn exec_count(&self) -> u32 {
        self.stats.count()
    }

    pub fn cpu_usage_percent(&self, now_ms: u32) -> f32 {
        self.stats.cpu_usage_percent(now_ms)
    }

    /// Zero every counter and open a fresh usage window at `now_ms`.
    pub fn reset_stats(&mut self, now_ms: u32) {
        self.stats = ExecStats::new(self.stats.window_ms, now_ms);
    }
}

impl core::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("label", &self.label)
            .field("interval_ms", &self.interval_ms)
            .field("repeat", &self.repeat)
            .field("paused", &self.paused)
            .field("high_priority", &self.high_priority)
            .field("timer", &self.timer)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
