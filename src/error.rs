//! Unified error types for the I/O controller firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! driving loop's error handling uniform.  All variants are `Copy` so they
//! can be returned from the dispatch path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The task scheduler refused an operation.
    Scheduler(SchedulerError),
    /// Configuration is invalid.
    Config(&'static str),
    /// A diagnostic report could not be produced or encoded.
    Report(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Report(msg) => write!(f, "report: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Every task slot is occupied.
    CapacityExhausted,
    /// The callback request queue is full; the request was dropped.
    RequestQueueFull,
    /// The task id counter would wrap and reuse an old identity.
    IdSpaceExhausted,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted => write!(f, "task capacity exhausted"),
            Self::RequestQueueFull => write!(f, "request queue full"),
            Self::IdSpaceExhausted => write!(f, "task id space exhausted"),
        }
    }
}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
