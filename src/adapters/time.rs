//! Clock adapters.
//!
//! - [`SystemClock`]: the real monotonic source.
//!   - **`target_os = "espidf"`** wraps `esp_timer_get_time()` (microsecond
//!     precision, monotonic).
//!   - **`not(target_os = "espidf")`** uses `std::time::Instant` for
//!     host-side simulation.
//! - [`ManualClock`]: a clock that only moves when told to, for tests and
//!   deterministic simulation.

use core::cell::Cell;

use crate::app::ports::Clock;

/// Monotonic time since construction (host) or since boot (ESP32).
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic, 64-bit).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the high-resolution timer and
        // has no preconditions once the system is booted.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic, 64-bit).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }

    fn now_us(&self) -> u32 {
        self.uptime_us() as u32
    }
}

/// Hand-driven clock.  Interior mutability lets callbacks advance time
/// to simulate their own execution cost.
#[derive(Debug, Default)]
pub struct ManualClock {
    us: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock reading `ms` milliseconds.
    pub fn starting_at(ms: u32) -> Self {
        let clock = Self::new();
        clock.set_ms(ms);
        clock
    }

    pub fn set_ms(&self, ms: u32) {
        self.us.set(u64::from(ms) * 1000);
    }

    pub fn advance_ms(&self, ms: u32) {
        self.advance_us(ms.saturating_mul(1000));
    }

    pub fn advance_us(&self, us: u32) {
        self.us.set(self.us.get() + u64::from(us));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        (self.us.get() / 1000) as u32
    }

    fn now_us(&self) -> u32 {
        self.us.get() as u32
    }
}
