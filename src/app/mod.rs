//! Application seams around the scheduler core.
//!
//! [`ports`] holds the traits the core consumes (clock, report sink);
//! [`throttle`] holds helpers for task callbacks that need their own
//! cadence on top of the one the scheduler grants them.

pub mod ports;
pub mod throttle;
