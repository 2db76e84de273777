//! Bioreactor I/O MCU Firmware: main entry point
//!
//! A single cooperative loop owns the scheduler and drives every I/O
//! consumer from it.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  LoopTicker (esp_timer, 1 kHz)                                 │
//! │      │ wait()                                                  │
//! │      ▼                                                         │
//! │  Scheduler::update()                                           │
//! │      ├── high:   modbus (10ms) · gpio (100ms)                  │
//! │      └── normal: outputs · rtd · ph · level · par · DO · report│
//! │      │                                                         │
//! │      ▼                                                         │
//! │  Watchdog::feed()                                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The consumers registered here are stand-ins that count and log; the
//! drivers behind them live on the other side of the Modbus link.

#![deny(unused_must_use)]

use std::rc::Rc;

use anyhow::Result;
use log::{debug, info, warn};

use bioreactor_io::adapters::log_sink::LogReportSink;
use bioreactor_io::adapters::time::SystemClock;
use bioreactor_io::app::ports::Clock;
use bioreactor_io::app::throttle::RateGate;
use bioreactor_io::config::{SchedulerConfig, TaskTimings};
use bioreactor_io::drivers::hw_timer::LoopTicker;
use bioreactor_io::drivers::watchdog::Watchdog;
use bioreactor_io::scheduler::Scheduler;

/// A stand-in consumer: counts its invocations and logs every `every`th.
fn counting(name: &'static str, every: u32) -> impl FnMut() + 'static {
    let mut runs: u32 = 0;
    move || {
        runs = runs.wrapping_add(1);
        if every != 0 && runs % every == 0 {
            debug!("{}: {} runs", name, runs);
        }
    }
}

fn init_logging() -> Result<()> {
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Bioreactor I/O v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SchedulerConfig::default();
    config.validate()?;
    let timings = TaskTimings::default();

    let clock = Rc::new(SystemClock::new());
    let mut scheduler: Scheduler<_> = Scheduler::with_config(Rc::clone(&clock), config.clone())?;
    scheduler.set_report_sink(Box::new(LogReportSink::new()));

    // ── 2. Register the I/O task set ──────────────────────────
    scheduler.add_labeled_task("modbus", counting("modbus", 1_000), timings.modbus_ms, true, true)?;
    scheduler.add_labeled_task("gpio", counting("gpio", 100), timings.gpio_ms, true, true)?;
    scheduler.add_labeled_task("outputs", counting("outputs", 100), timings.outputs_ms, true, false)?;
    scheduler.add_labeled_task("rtd", counting("rtd", 10), timings.rtd_ms, true, false)?;
    scheduler.add_labeled_task("ph", counting("ph", 5), timings.probe_ms, true, false)?;
    scheduler.add_labeled_task("level", counting("level", 5), timings.probe_ms, true, false)?;
    scheduler.add_labeled_task("par", counting("par", 5), timings.probe_ms, true, false)?;

    // DO controller: invoked at 10 Hz, acts at 1 Hz.
    let do_clock = Rc::clone(&clock);
    let mut do_gate = RateGate::new(timings.do_gate_ms);
    let mut steps: u32 = 0;
    scheduler.add_labeled_task(
        "do-control",
        move || {
            if do_gate.ready(do_clock.now_ms()) {
                steps = steps.wrapping_add(1);
                debug!("do-control: step {} ({} skipped)", steps, do_gate.skipped());
            }
        },
        timings.do_control_ms,
        true,
        false,
    )?;

    let report_handle = scheduler.handle();
    scheduler.add_labeled_task(
        "report",
        move || {
            if let Err(e) = report_handle.request_report() {
                warn!("report: {}", e);
            }
        },
        config.report_interval_ms,
        true,
        false,
    )?;

    info!("Scheduler: {} tasks registered", scheduler.len());

    // ── 3. Main loop ──────────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let mut ticker = LoopTicker::start(config.loop_tick_us)?;

    loop {
        ticker.wait();
        scheduler.update();
        watchdog.feed();
    }
}
