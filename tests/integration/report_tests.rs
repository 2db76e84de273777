//! CPU usage reports: sinks, handle-requested reports and encoding.

use std::rc::Rc;

use bioreactor_io::diagnostics::SchedulerReport;
use bioreactor_io::scheduler::Scheduler;
use bioreactor_io::SchedulerConfig;

use super::mock_clock::{run_for, sim_clock, CollectingSink, Recorder};

#[test]
fn report_lists_live_tasks_in_registration_order() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let rec = Recorder::new();
    sched.add_labeled_task("modbus", rec.probe("modbus"), 10, true, true).unwrap();
    let gone = sched.add_labeled_task("scratch", rec.probe("scratch"), 10, true, false).unwrap();
    sched.add_labeled_task("rtd", rec.probe("rtd"), 1_000, true, false).unwrap();
    sched.remove_task(gone);

    run_for(&mut sched, &clock, 100);
    let report = sched.report();

    let labels: Vec<&str> = report.tasks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["modbus", "rtd"]);
    assert_eq!(report.uptime_ms, 100);
    assert_eq!(report.passes, 100);
    assert!(!report.truncated);

    let modbus = &report.tasks[0];
    assert!(modbus.high_priority);
    assert_eq!(modbus.exec_count, 10);
    assert_eq!(report.tasks[1].exec_count, 0);
}

#[test]
fn task_requests_report_through_handle() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    let sink = CollectingSink::new();
    sched.set_report_sink(Box::new(sink.clone()));

    let handle = sched.handle();
    sched
        .add_labeled_task(
            "report",
            move || {
                handle.request_report().unwrap();
            },
            50,
            true,
            false,
        )
        .unwrap();

    run_for(&mut sched, &clock, 200);

    assert_eq!(sink.len(), 4);
    let last = sink.last().unwrap();
    assert_eq!(last.tasks.len(), 1);
    assert_eq!(last.tasks[0].label.as_str(), "report");
    // Snapshot taken right after the callback that asked for it.
    assert_eq!(last.uptime_ms, 200);
}

#[test]
fn overload_flag_follows_threshold() {
    let clock = sim_clock(0);
    let config = SchedulerConfig {
        overload_threshold_percent: 10.0,
        ..SchedulerConfig::default()
    };
    let mut sched: Scheduler<_> = Scheduler::with_config(Rc::clone(&clock), config).unwrap();
    let c = Rc::clone(&clock);
    sched.add_labeled_task("hog", move || c.advance_ms(5), 10, true, false).unwrap();

    run_for(&mut sched, &clock, 100);

    let report = sched.report();
    assert!(report.overloaded);
    assert_eq!(report.busiest().unwrap().label.as_str(), "hog");
    assert!(sched.is_overloaded());
}

#[test]
fn report_survives_postcard_link() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    sched.add_labeled_task("ph", || {}, 20, true, false).unwrap();
    sched.add_labeled_task("par", || {}, 0, true, false).unwrap();
    run_for(&mut sched, &clock, 100);

    let report = sched.report();
    let mut buf = [0u8; 512];
    let len = report.encode(&mut buf).unwrap().len();
    let back = SchedulerReport::decode(&buf[..len]).unwrap();

    assert_eq!(back, report);
    assert!(back.tasks[1].inert);
}

#[test]
fn print_report_logs_without_a_sink() {
    let clock = sim_clock(0);
    let mut sched = Scheduler::new(Rc::clone(&clock));
    sched.add_labeled_task("gpio", || {}, 100, true, true).unwrap();
    run_for(&mut sched, &clock, 300);
    sched.print_cpu_usage_report();
    sched.emit_report();
}
