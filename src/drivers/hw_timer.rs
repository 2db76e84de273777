//! Loop pacing on top of ESP-IDF's esp_timer API.
//!
//! The scheduler itself never sleeps; [`LoopTicker`] throttles the main
//! loop to one pass per tick so the idle task still gets CPU time and
//! the TWDT idle hook is satisfied.
//!
//! On ESP-IDF a periodic esp_timer bumps a counter owned by the ticker
//! (passed to the callback as its `arg`), and `wait()` yields to
//! FreeRTOS until the counter moves.  On simulation targets `wait()`
//! sleeps for one period.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR), so
//! an atomic store is all they do.

use log::info;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::{Error, Result};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `AtomicU32` boxed by `LoopTicker::start`, which
    // stops and deletes this timer before freeing it.
    let ticks = unsafe { &*(arg as *const AtomicU32) };
    ticks.fetch_add(1, Ordering::Release);
}

/// Paces the main loop at a fixed period.
pub struct LoopTicker {
    period_us: u32,
    #[cfg(target_os = "espidf")]
    handle: esp_timer_handle_t,
    #[cfg(target_os = "espidf")]
    ticks: Box<AtomicU32>,
    #[cfg(target_os = "espidf")]
    seen: u32,
}

impl LoopTicker {
    /// Start a periodic tick of `period_us` microseconds.
    #[cfg(target_os = "espidf")]
    pub fn start(period_us: u32) -> Result<Self> {
        if period_us == 0 {
            return Err(Error::Config("tick period must be non-zero"));
        }
        let ticks = Box::new(AtomicU32::new(0));
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();

        // SAFETY: the args struct is copied by esp_timer_create; `arg`
        // points into a Box that outlives the timer (see Drop).
        unsafe {
            let args = esp_timer_create_args_t {
                callback: Some(tick_cb),
                arg: &*ticks as *const AtomicU32 as *mut core::ffi::c_void,
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: c"loop_tick".as_ptr(),
                skip_unhandled_events: true,
            };
            let ret = esp_timer_create(&args, &mut handle);
            if ret != ESP_OK {
                log::error!("hw_timer: loop tick create failed (rc={})", ret);
                return Err(Error::Config("esp_timer_create failed"));
            }
            let ret = esp_timer_start_periodic(handle, u64::from(period_us));
            if ret != ESP_OK {
                log::error!("hw_timer: loop tick start failed (rc={})", ret);
                esp_timer_delete(handle);
                return Err(Error::Config("esp_timer_start_periodic failed"));
            }
        }

        info!("hw_timer: loop tick every {}us", period_us);
        Ok(Self { period_us, handle, ticks, seen: 0 })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start(period_us: u32) -> Result<Self> {
        if period_us == 0 {
            return Err(Error::Config("tick period must be non-zero"));
        }
        info!("hw_timer(sim): loop tick every {}us (sleep)", period_us);
        Ok(Self { period_us })
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Block until the next tick.
    #[cfg(target_os = "espidf")]
    pub fn wait(&mut self) {
        loop {
            let now = self.ticks.load(Ordering::Acquire);
            if now != self.seen {
                self.seen = now;
                return;
            }
            // SAFETY: plain FreeRTOS yield from task context.
            unsafe { vTaskDelay(1) };
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn wait(&mut self) {
        std::thread::sleep(std::time::Duration::from_micros(u64::from(self.period_us)));
    }
}

#[cfg(target_os = "espidf")]
impl Drop for LoopTicker {
    fn drop(&mut self) {
        // SAFETY: `handle` was created in `start`; stopping before delete
        // guarantees no callback touches `ticks` after it is freed.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}
