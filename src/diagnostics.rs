//! CPU usage reporting.
//!
//! A [`SchedulerReport`] is a point-in-time copy of every task's timing
//! statistics.  It is plain data: the scheduler builds it, a
//! [`ReportSink`](crate::app::ports::ReportSink) decides where it goes.
//! Reports can be postcard-encoded into a caller buffer for whatever
//! link forwards diagnostics to the system MCU.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scheduler::{MAX_TASKS, ScheduledTask, TaskId};

/// Longest task label kept in a report.
pub const LABEL_LEN: usize = 24;

/// Timing statistics of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub id: u32,
    pub label: heapless::String<LABEL_LEN>,
    pub interval_ms: u32,
    pub high_priority: bool,
    pub paused: bool,
    pub inert: bool,
    pub exec_count: u32,
    pub last_us: u32,
    /// `0` until the first execution.
    pub min_us: u32,
    pub max_us: u32,
    pub avg_us: f32,
    pub cpu_percent: f32,
}

/// Longest prefix of `name` that fits a report label, cut on a char boundary.
fn truncated_label(name: &str) -> heapless::String<LABEL_LEN> {
    let mut label = heapless::String::new();
    for c in name.chars() {
        if label.push(c).is_err() {
            break;
        }
    }
    label
}

impl TaskReport {
    pub fn from_task(id: TaskId, task: &ScheduledTask, now_ms: u32) -> Self {
        Self {
            id: id.as_u32(),
            label: truncated_label(task.label()),
            interval_ms: task.interval(),
            high_priority: task.is_high_priority(),
            paused: task.is_paused(),
            inert: task.is_inert(),
            exec_count: task.exec_count(),
            last_us: task.last_exec_us(),
            min_us: task.min_exec_us().unwrap_or(0),
            max_us: task.max_exec_us(),
            avg_us: task.average_exec_us(),
            cpu_percent: task.cpu_usage_percent(now_ms),
        }
    }
}

/// Snapshot of the whole scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerReport {
    pub uptime_ms: u32,
    pub passes: u64,
    /// Sum of per-task usage, unclamped.
    pub total_cpu_percent: f32,
    pub overloaded: bool,
    /// More tasks were registered than a report holds.
    pub truncated: bool,
    pub tasks: heapless::Vec<TaskReport, MAX_TASKS>,
}

impl SchedulerReport {
    pub fn new(uptime_ms: u32, passes: u64) -> Self {
        Self {
            uptime_ms,
            passes,
            total_cpu_percent: 0.0,
            overloaded: false,
            truncated: false,
            tasks: heapless::Vec::new(),
        }
    }

    /// Add a task row.  Its usage always counts toward the total, even
    /// when the row itself no longer fits.
    pub fn push(&mut self, task: TaskReport) {
        self.total_cpu_percent += task.cpu_percent;
        if self.tasks.push(task).is_err() {
            self.truncated = true;
        }
    }

    /// The task with the highest windowed usage.
    pub fn busiest(&self) -> Option<&TaskReport> {
        self.tasks
            .iter()
            .max_by(|a, b| a.cpu_percent.total_cmp(&b.cpu_percent))
    }

    /// Encode into `buf`, returning the used prefix.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8]> {
        postcard::to_slice(self, buf).map_err(|_| Error::Report("buffer too small for report"))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        postcard::from_bytes(bytes).map_err(|_| Error::Report("malformed report"))
    }
}
