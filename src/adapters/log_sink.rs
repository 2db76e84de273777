//! Log-based report sink adapter.
//!
//! Implements [`ReportSink`] by writing the CPU usage table to the logger
//! (UART / USB-CDC in production, stderr on host).  The full report is
//! also emitted as one JSON line at debug level for machine scraping.

use log::{debug, info, log_enabled, warn, Level};

use crate::app::ports::ReportSink;
use crate::diagnostics::SchedulerReport;

/// Adapter that logs every [`SchedulerReport`] to the serial console.
#[derive(Debug, Default)]
pub struct LogReportSink;

impl LogReportSink {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for LogReportSink {
    fn emit(&mut self, report: &SchedulerReport) {
        info!(
            "CPU | uptime={}ms passes={} tasks={} total={:.2}%",
            report.uptime_ms,
            report.passes,
            report.tasks.len(),
            report.total_cpu_percent,
        );
        for t in &report.tasks {
            info!(
                "CPU | {:>3} {:<16} {} {:>6}ms{} | runs={} last={}us min={}us max={}us avg={:.1}us | {:.2}%",
                t.id,
                t.label.as_str(),
                if t.high_priority { "H" } else { "N" },
                t.interval_ms,
                if t.paused {
                    " paused"
                } else if t.inert {
                    " inert"
                } else {
                    ""
                },
                t.exec_count,
                t.last_us,
                t.min_us,
                t.max_us,
                t.avg_us,
                t.cpu_percent,
            );
        }
        if report.truncated {
            warn!("CPU | report truncated to {} tasks", report.tasks.len());
        }
        if report.overloaded {
            warn!(
                "CPU | OVERLOAD total={:.1}% busiest={}",
                report.total_cpu_percent,
                report.busiest().map_or("-", |t| t.label.as_str()),
            );
        }

        if log_enabled!(Level::Debug) {
            if let Ok(json) = serde_json::to_string(report) {
                debug!("CPU | {}", json);
            }
        }
    }
}
