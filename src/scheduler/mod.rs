//! Cooperative task scheduler.
//!
//! Turns a flat set of periodic and one-shot jobs into a deterministic,
//! non-blocking execution sequence on a single thread.  Every call to
//! [`Scheduler::update`] is one dispatch pass:
//!
//! ```text
//!   update()
//!     │
//!     ├─ apply queued handle requests
//!     ├─ high-priority tasks, registration order ──┐
//!     ├─ normal tasks, registration order ─────────┤ for each due task:
//!     │                                            │   run callback
//!     │                                            │   record duration
//!     │                                            │   apply requests it queued
//!     └─ reclaim slots of removed tasks ◀──────────┘
//! ```
//!
//! Priority only decides polling order inside a pass.  A running callback
//! is never interrupted, so one blocking callback stalls every task.
//!
//! Finished one-shot tasks stay registered (inert) until removed, so they
//! keep their statistics and remain addressable through their [`TaskId`].

pub mod handle;
pub mod task;

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use heapless::{Deque, Vec};
use log::{debug, info, warn};

use crate::adapters::log_sink::LogReportSink;
use crate::app::ports::{Clock, ReportSink};
use crate::config::SchedulerConfig;
use crate::diagnostics::{SchedulerReport, TaskReport};
use crate::error::{Result, SchedulerError};

pub use handle::SchedulerHandle;
use handle::{Request, RequestQueue};
pub use task::{ExecStats, ScheduledTask, TaskCallback};

/// Default number of task slots.
pub const MAX_TASKS: usize = 16;

/// Label given to tasks registered without one.
pub const DEFAULT_LABEL: &str = "task";

/// Stable handle to a registered task.  Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Internal bookkeeping for a registered task.
struct TaskSlot {
    id: TaskId,
    task: ScheduledTask,
    /// Set when removed mid-pass; the slot is reclaimed at the end of the pass.
    removed: bool,
}

/// The scheduler engine.  Owns every task; `N` bounds the task count.
pub struct Scheduler<C: Clock, const N: usize = MAX_TASKS> {
    clock: C,
    config: SchedulerConfig,
    tasks: Vec<TaskSlot, N>,
    requests: RequestQueue,
    report_sink: Box<dyn ReportSink>,
    next_id: u32,
    passes: u64,
}

impl<C: Clock> Scheduler<C, MAX_TASKS> {
    /// Scheduler with [`MAX_TASKS`] slots and default configuration.
    pub fn new(clock: C) -> Self {
        Self::build(clock, SchedulerConfig::default())
    }
}

impl<C: Clock, const N: usize> Scheduler<C, N> {
    /// Scheduler with a custom configuration.  Rejects a configuration
    /// that fails [`SchedulerConfig::validate`].
    pub fn with_config(clock: C, config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(clock, config))
    }

    fn build(clock: C, config: SchedulerConfig) -> Self {
        Self {
            clock,
            config,
            tasks: Vec::new(),
            requests: Rc::new(RefCell::new(Deque::new())),
            report_sink: Box::new(LogReportSink::new()),
            next_id: 0,
            passes: 0,
        }
    }

    /// Replace the sink used by [`emit_report`](Self::emit_report) and by
    /// report requests from callbacks.
    pub fn set_report_sink(&mut self, sink: Box<dyn ReportSink>) {
        self.report_sink = sink;
    }

    /// Handle that callbacks can capture to queue requests.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle::new(self.requests.clone())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ── Registration ─────────────────────────────────────────────

    /// Register an unlabeled task.  See [`add_labeled_task`](Self::add_labeled_task).
    pub fn add_task<F>(
        &mut self,
        callback: F,
        interval_ms: u32,
        repeat: bool,
        high_priority: bool,
    ) -> Result<TaskId>
    where
        F: FnMut() + 'static,
    {
        self.add_labeled_task(DEFAULT_LABEL, callback, interval_ms, repeat, high_priority)
    }

    /// Register a task and arm its timer from the current time.
    ///
    /// `interval_ms == 0` yields a task that never fires.  Fails with
    /// [`SchedulerError::CapacityExhausted`] when all `N` slots are taken.
    pub fn add_labeled_task<F>(
        &mut self,
        label: &'static str,
        callback: F,
        interval_ms: u32,
        repeat: bool,
        high_priority: bool,
    ) -> Result<TaskId>
    where
        F: FnMut() + 'static,
    {
        if self.tasks.is_full() {
            warn!("Scheduler: cannot add '{}', all {} slots in use", label, N);
            return Err(SchedulerError::CapacityExhausted.into());
        }
        let id = TaskId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(SchedulerError::IdSpaceExhausted)?;

        let task = ScheduledTask::new(
            label,
            Box::new(callback),
            interval_ms,
            repeat,
            high_priority,
            self.clock.now_ms(),
            self.config.usage_window_ms,
        );
        self.tasks
            .push(TaskSlot {
                id,
                task,
                removed: false,
            })
            .map_err(|_| SchedulerError::CapacityExhausted)?;

        if interval_ms == 0 {
            warn!("Scheduler: '{}' {} registered with zero interval, it will never fire", label, id);
        } else {
            info!(
                "Scheduler: added '{}' {} every {}ms ({}, {})",
                label,
                id,
                interval_ms,
                if repeat { "periodic" } else { "one-shot" },
                if high_priority { "high" } else { "normal" },
            );
        }
        Ok(id)
    }

    /// Remove a task.  Unknown or already removed ids are ignored.
    /// Returns whether a task was removed.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        match self.position(id) {
            Some(pos) => {
                let slot = self.tasks.remove(pos);
                info!("Scheduler: removed '{}' {}", slot.task.label(), id);
                true
            }
            None => false,
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Run one dispatch pass.  Returns the number of callbacks executed.
    pub fn update(&mut self) -> usize {
        self.process_requests();

        let mut fired = 0;
        for high_priority in [true, false] {
            for i in 0..self.tasks.len() {
                let slot = &mut self.tasks[i];
                if slot.removed || slot.task.is_high_priority() != high_priority {
                    continue;
                }
                if slot.task.update(&self.clock) {
                    fired += 1;
                    self.drain_requests();
                }
            }
        }

        self.reclaim();
        self.passes = self.passes.wrapping_add(1);
        if fired > 0 {
            debug!("Scheduler: pass {} ran {} task(s)", self.passes, fired);
        }
        fired
    }

    /// Apply requests queued through [`SchedulerHandle`]s and release the
    /// slots of removed tasks.
    pub fn process_requests(&mut self) {
        self.drain_requests();
        self.reclaim();
    }

    /// Apply queued requests.  Safe mid-pass: removal only marks slots.
    fn drain_requests(&mut self) {
        loop {
            // Short borrow: applying a request never calls back into a task.
            let next = self.requests.borrow_mut().pop_front();
            let Some(request) = next else { break };

            match request {
                Request::Remove(id) => {
                    if let Some(slot) = self.live_slot_mut(id) {
                        slot.removed = true;
                        info!("Scheduler: removed '{}' {}", slot.task.label(), id);
                    } else {
                        debug!("Scheduler: remove of unknown task {} ignored", id);
                    }
                }
                Request::Pause(id) => {
                    self.pause_task(id);
                }
                Request::Resume(id) => {
                    self.resume_task(id);
                }
                Request::Report => self.emit_report(),
            }
        }
    }

    fn reclaim(&mut self) {
        self.tasks.retain(|slot| !slot.removed);
    }

    /// Completed dispatch passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    // ── Task access ──────────────────────────────────────────────

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|slot| slot.id == id && !slot.removed)
    }

    fn live_slot_mut(&mut self, id: TaskId) -> Option<&mut TaskSlot> {
        self.tasks
            .iter_mut()
            .find(|slot| slot.id == id && !slot.removed)
    }

    pub fn task(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.position(id).map(|pos| &self.tasks[pos].task)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut ScheduledTask> {
        self.live_slot_mut(id).map(|slot| &mut slot.task)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.position(id).is_some()
    }

    /// Registered tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &ScheduledTask)> {
        self.tasks
            .iter()
            .filter(|slot| !slot.removed)
            .map(|slot| (slot.id, &slot.task))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn pause_task(&mut self, id: TaskId) -> bool {
        self.task_mut(id).map(ScheduledTask::pause).is_some()
    }

    pub fn resume_task(&mut self, id: TaskId) -> bool {
        self.task_mut(id).map(ScheduledTask::resume).is_some()
    }

    pub fn set_task_interval(&mut self, id: TaskId, interval_ms: u32) -> bool {
        self.task_mut(id)
            .map(|task| task.set_interval(interval_ms))
            .is_some()
    }

    pub fn reset_task_stats(&mut self, id: TaskId) -> bool {
        let now_ms = self.clock.now_ms();
        self.task_mut(id)
            .map(|task| task.reset_stats(now_ms))
            .is_some()
    }

    // ── Diagnostics ──────────────────────────────────────────────

    pub fn cpu_usage_percent(&self, id: TaskId) -> Option<f32> {
        let now_ms = self.clock.now_ms();
        self.task(id).map(|task| task.cpu_usage_percent(now_ms))
    }

    /// Sum of every task's windowed usage.  Unclamped, so overload reads
    /// above 100 %.
    pub fn total_cpu_usage_percent(&self) -> f32 {
        let now_ms = self.clock.now_ms();
        self.iter()
            .map(|(_, task)| task.cpu_usage_percent(now_ms))
            .sum()
    }

    /// Aggregate usage at or above the configured threshold.
    pub fn is_overloaded(&self) -> bool {
        self.total_cpu_usage_percent() >= self.config.overload_threshold_percent
    }

    /// Snapshot of every task's timing statistics.
    pub fn report(&self) -> SchedulerReport {
        let now_ms = self.clock.now_ms();
        let mut report = SchedulerReport::new(now_ms, self.passes);
        for (id, task) in self.iter() {
            report.push(TaskReport::from_task(id, task, now_ms));
        }
        report.overloaded = report.total_cpu_percent >= self.config.overload_threshold_percent;
        report
    }

    /// Send a snapshot to the configured report sink.
    pub fn emit_report(&mut self) {
        let report = self.report();
        self.report_sink.emit(&report);
    }

    /// Dump the CPU usage table to the log.
    pub fn print_cpu_usage_report(&self) {
        LogReportSink::new().emit(&self.report());
    }
}

impl<C: Clock, const N: usize> fmt::Debug for Scheduler<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.len())
            .field("capacity", &N)
            .field("passes", &self.passes)
            .field("pending_requests", &self.requests.borrow().len())
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
