//! Port traits: the boundary between the scheduler core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler (core)
//! ```
//!
//! Driven adapters (clock source, report sinks) implement these traits.
//! The [`Scheduler`](crate::scheduler::Scheduler) consumes them via
//! generics, so the core never touches a hardware timer directly.

use std::rc::Rc;

use crate::diagnostics::SchedulerReport;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → core)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
///
/// Both counters are free-running and wrap; consumers only ever take
/// `wrapping_sub` differences between two readings.
pub trait Clock {
    /// Milliseconds since boot, truncated to `u32`.
    fn now_ms(&self) -> u32;

    /// Microseconds since boot, truncated to `u32`.
    ///
    /// Used only to time callback execution.  Sources without a finer
    /// counter fall back to millisecond resolution.
    fn now_us(&self) -> u32 {
        self.now_ms().wrapping_mul(1000)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

// ───────────────────────────────────────────────────────────────
// Report sink port (driven adapter: core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The scheduler emits CPU usage snapshots through this port.  Adapters
/// decide where they go (serial log, inter-MCU link, etc.).
pub trait ReportSink {
    fn emit(&mut self, report: &SchedulerReport);
}
