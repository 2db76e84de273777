//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the scheduler through
//! its public API against a hand-driven clock.  All tests run on the host
//! (x86_64) with no real hardware required.

mod mock_clock;
mod report_tests;
mod stats_tests;
