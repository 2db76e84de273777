//! Scheduler and task timing configuration
//!
//! All tunable timing parameters for the I/O controller.
//! Values are compiled-in defaults; the system MCU may push overrides
//! which must pass [`SchedulerConfig::validate`] before use.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of the rolling CPU-usage window (milliseconds).
pub const DEFAULT_USAGE_WINDOW_MS: u32 = 10_000;

/// Core scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    // --- CPU accounting ---
    /// Rolling usage window width in milliseconds
    pub usage_window_ms: u32,
    /// Aggregate usage (percent) above which the scheduler reports overload
    pub overload_threshold_percent: f32,

    // --- Diagnostics ---
    /// CPU usage report interval (milliseconds)
    pub report_interval_ms: u32,

    // --- Driving loop ---
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
    /// Period of the loop pacing tick (microseconds)
    pub loop_tick_us: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            usage_window_ms: DEFAULT_USAGE_WINDOW_MS,
            overload_threshold_percent: 80.0,

            report_interval_ms: 5_000,

            watchdog_timeout_ms: 10_000,
            loop_tick_us: 1_000, // 1 kHz dispatch
        }
    }
}

impl SchedulerConfig {
    /// Reject values that would make the accounting or the loop meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.usage_window_ms == 0 {
            return Err(Error::Config("usage window must be non-zero"));
        }
        if !self.overload_threshold_percent.is_finite() || self.overload_threshold_percent <= 0.0
        {
            return Err(Error::Config("overload threshold must be a positive percentage"));
        }
        if self.watchdog_timeout_ms == 0 {
            return Err(Error::Config("watchdog timeout must be non-zero"));
        }
        if self.loop_tick_us == 0 {
            return Err(Error::Config("loop tick must be non-zero"));
        }
        if u64::from(self.loop_tick_us) >= u64::from(self.watchdog_timeout_ms) * 1000 {
            return Err(Error::Config("loop tick must be shorter than the watchdog timeout"));
        }
        Ok(())
    }
}

/// Task cadences of the I/O MCU (milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTimings {
    /// Modbus master poll (high priority)
    pub modbus_ms: u32,
    /// Digital input sampling (high priority)
    pub gpio_ms: u32,
    /// Output driver refresh
    pub outputs_ms: u32,
    /// RTD temperature conversion
    pub rtd_ms: u32,
    /// pH / level / PAR probe requests
    pub probe_ms: u32,
    /// Dissolved-oxygen controller invocation cadence
    pub do_control_ms: u32,
    /// Internal DO controller gate (1 Hz)
    pub do_gate_ms: u32,
}

impl Default for TaskTimings {
    fn default() -> Self {
        Self {
            modbus_ms: 10,
            gpio_ms: 100,
            outputs_ms: 100,
            rtd_ms: 1_000,
            probe_ms: 2_000,
            do_control_ms: 100,
            do_gate_ms: 1_000,
        }
    }
}
