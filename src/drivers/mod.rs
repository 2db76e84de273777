//! Loop pacing and supervision.

pub mod hw_timer;
pub mod watchdog;
