//! Simulation helpers for integration tests.
//!
//! A shared [`ManualClock`] stands in for the hardware timer, recording
//! closures stand in for I/O consumers, and [`CollectingSink`] keeps every
//! emitted report for later inspection.

use std::cell::RefCell;
use std::rc::Rc;

use bioreactor_io::adapters::time::ManualClock;
use bioreactor_io::app::ports::{Clock, ReportSink};
use bioreactor_io::diagnostics::SchedulerReport;
use bioreactor_io::scheduler::Scheduler;

pub type SimClock = Rc<ManualClock>;

pub fn sim_clock(start_ms: u32) -> SimClock {
    Rc::new(ManualClock::starting_at(start_ms))
}

/// Advance one millisecond at a time for `ms` milliseconds, running a
/// dispatch pass after every step.
pub fn run_for<C: Clock, const N: usize>(sched: &mut Scheduler<C, N>, clock: &ManualClock, ms: u32) -> usize {
    let mut fired = 0;
    for _ in 0..ms {
        clock.advance_ms(1);
        fired += sched.update();
    }
    fired
}

// ── Call recorder ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<&'static str>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that appends `name` to the call log.
    pub fn probe(&self, name: &'static str) -> impl FnMut() + 'static {
        let calls = Rc::clone(&self.calls);
        move || calls.borrow_mut().push(name)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

// ── Report sink ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct CollectingSink {
    pub reports: Rc<RefCell<Vec<SchedulerReport>>>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn last(&self) -> Option<SchedulerReport> {
        self.reports.borrow().last().cloned()
    }
}

impl ReportSink for CollectingSink {
    fn emit(&mut self, report: &SchedulerReport) {
        self.reports.borrow_mut().push(report.clone());
    }
}
