//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements  | Connects to                        |
//! |------------|-------------|------------------------------------|
//! | `log_sink` | ReportSink  | Serial log output                  |
//! | `time`     | Clock       | ESP32 system timer / host Instant  |
//! |            |             | manual clock for simulation        |

pub mod log_sink;
pub mod time;
