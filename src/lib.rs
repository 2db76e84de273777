//! Bioreactor I/O MCU firmware library.
//!
//! Cooperative real-time task scheduling for the I/O controller: a
//! non-blocking delay timer, scheduled tasks with execution statistics,
//! and the scheduler that dispatches them from a single loop.  Exposes
//! the pure-logic modules for integration testing.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod scheduler;
pub mod timer;

// Hardware-facing modules compile on host with simulation fallbacks.
pub mod adapters;
pub mod drivers;

pub use app::ports::{Clock, ReportSink};
pub use config::{SchedulerConfig, TaskTimings};
pub use error::{Error, Result, SchedulerError};
pub use scheduler::{Scheduler, SchedulerHandle, TaskId};
pub use timer::DelayTimer;
