//! Execution statistics and the rolling CPU usage window.

use std::rc::Rc;

use bioreactor_io::scheduler::Scheduler;
use bioreactor_io::SchedulerConfig;

use super::mock_clock::{run_for, sim_clock, SimClock};

/// A callback that costs `us` microseconds of simulated time.
fn busy(clock: &SimClock, us: u32) -> impl FnMut() + 'static {
    let clock = Rc::clone(clock);
    move || clock.advance_us(us)
}

#[test]
fn reset_then_single_run_gives_identical_stats() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let id = sched.add_task(busy(&clock, 250), 10, true, false).unwrap();

    // Build up some history first.
    run_for(&mut sched, &clock, 30);
    assert!(sched.task(id).unwrap().exec_count() > 0);

    assert!(sched.reset_task_stats(id));
    let task = sched.task(id).unwrap();
    assert_eq!(task.exec_count(), 0);
    assert_eq!(task.min_exec_us(), None);
    assert_eq!(task.average_exec_us(), 0.0);

    // Next expiry is within 10ms of the reset.
    for _ in 0..10 {
        clock.advance_ms(1);
        if sched.update() > 0 {
            break;
        }
    }

    let task = sched.task(id).unwrap();
    assert_eq!(task.exec_count(), 1);
    assert_eq!(task.last_exec_us(), 250);
    assert_eq!(task.min_exec_us(), Some(250));
    assert_eq!(task.max_exec_us(), 250);
    assert_eq!(task.average_exec_us(), 250.0);
}

#[test]
fn min_max_avg_over_varying_costs() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let costs = [100u32, 300, 200];
    let mut i = 0;
    let c = Rc::clone(&clock);
    let id = sched
        .add_task(
            move || {
                c.advance_us(costs[i % costs.len()]);
                i += 1;
            },
            10,
            true,
            false,
        )
        .unwrap();

    // Three runs at 10, 20, 30 ms (callback time keeps us under the next deadline).
    for t in [10, 20, 30] {
        clock.set_ms(t);
        sched.update();
    }

    let task = sched.task(id).unwrap();
    assert_eq!(task.exec_count(), 3);
    assert_eq!(task.min_exec_us(), Some(100));
    assert_eq!(task.max_exec_us(), 300);
    assert_eq!(task.last_exec_us(), 200);
    assert!((task.average_exec_us() - 200.0).abs() < 0.01);
    assert_eq!(task.stats().total_us(), 600);
}

#[test]
fn one_100ms_run_in_10s_window_is_one_percent() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let id = sched.add_task(busy(&clock, 100_000), 10, false, false).unwrap();
    sched.reset_task_stats(id);

    clock.set_ms(10);
    assert_eq!(sched.update(), 1);

    clock.set_ms(10_000);
    let usage = sched.cpu_usage_percent(id).unwrap();
    assert!((usage - 1.0).abs() < 0.01, "usage {}", usage);
}

#[test]
fn usage_is_zero_before_any_run() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let id = sched.add_task(|| {}, 1_000, true, false).unwrap();
    assert_eq!(sched.cpu_usage_percent(id), Some(0.0));
    run_for(&mut sched, &clock, 500);
    assert_eq!(sched.cpu_usage_percent(id), Some(0.0));
}

#[test]
fn window_restarts_after_it_elapses() {
    let clock = sim_clock(0);
    let config = SchedulerConfig {
        usage_window_ms: 1_000,
        ..SchedulerConfig::default()
    };
    let mut sched: Scheduler<_> = Scheduler::with_config(Rc::clone(&clock), config).unwrap();
    let id = sched.add_task(busy(&clock, 10_000), 100, true, false).unwrap();

    clock.set_ms(100);
    sched.update();
    assert_eq!(sched.task(id).unwrap().stats().window_busy_us(), 10_000);
    assert_eq!(sched.task(id).unwrap().stats().window_start_ms(), 0);

    clock.set_ms(5_000);
    sched.update();
    let stats = *sched.task(id).unwrap().stats();
    assert_eq!(stats.window_start_ms(), 5_000);
    assert_eq!(stats.window_busy_us(), 10_000);
    // Lifetime counters are unaffected by the window.
    assert_eq!(stats.count(), 2);
    assert_eq!(stats.total_us(), 20_000);
}

#[test]
fn total_usage_is_sum_and_drives_overload() {
    let clock = sim_clock(0);
    let config = SchedulerConfig {
        overload_threshold_percent: 50.0,
        ..SchedulerConfig::default()
    };
    let mut sched: Scheduler<_> = Scheduler::with_config(Rc::clone(&clock), config).unwrap();
    let a = sched.add_task(busy(&clock, 6_000), 10, true, false).unwrap();
    let b = sched.add_task(busy(&clock, 6_000), 10, true, false).unwrap();

    // Both run back to back: 12ms busy out of 22ms.
    clock.set_ms(10);
    sched.update();

    let total = sched.total_cpu_usage_percent();
    let sum = sched.cpu_usage_percent(a).unwrap() + sched.cpu_usage_percent(b).unwrap();
    assert!((total - sum).abs() < 0.001);
    assert!((total - 54.5).abs() < 0.1, "total {}", total);
    assert!(sched.is_overloaded());
}

#[test]
fn light_load_is_not_overloaded() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    sched.add_task(busy(&clock, 50), 10, true, false).unwrap();
    run_for(&mut sched, &clock, 1_000);
    assert!(!sched.is_overloaded());
    assert!(sched.total_cpu_usage_percent() < 1.0);
}
