//! Fuzz target: `Scheduler` dispatch under arbitrary registry churn
//!
//! Decodes the input as a stream of two-byte operations (add, remove,
//! pause, resume, interval change, handle removal, clock advance) and
//! applies them to a small scheduler driven by a manual clock.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Registered task count never exceeds capacity
//! - Removed tasks never run again
//! - Each task runs at most once per dispatch pass
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use bioreactor_io::adapters::time::ManualClock;
use bioreactor_io::scheduler::{Scheduler, TaskId};
use bioreactor_io::SchedulerConfig;
use libfuzzer_sys::fuzz_target;

const CAP: usize = 8;

fn pick(ids: &[TaskId], arg: u8) -> Option<TaskId> {
    if ids.is_empty() {
        return None;
    }
    ids.get(usize::from(arg) % ids.len()).copied()
}

fuzz_target!(|data: &[u8]| {
    let clock = Rc::new(ManualClock::new());
    let mut sched: Scheduler<_, CAP> =
        Scheduler::with_config(Rc::clone(&clock), SchedulerConfig::default()).unwrap();
    let handle = sched.handle();

    let runs: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let mut ids: Vec<TaskId> = Vec::new();
    let mut removed: Vec<TaskId> = Vec::new();

    for op in data.chunks_exact(2) {
        let (kind, arg) = (op[0] % 7, op[1]);

        match kind {
            0 => {
                let seq = ids.len();
                let r = Rc::clone(&runs);
                let interval = u32::from(arg % 64);
                let repeat = arg & 0x40 != 0;
                let high = arg & 0x80 != 0;
                if let Ok(id) = sched.add_task(move || r.borrow_mut().push(seq), interval, repeat, high) {
                    ids.push(id);
                }
            }
            1 => {
                if let Some(id) = pick(&ids, arg) {
                    if sched.remove_task(id) {
                        removed.push(id);
                    }
                }
            }
            2 => {
                if let Some(id) = pick(&ids, arg) {
                    sched.pause_task(id);
                }
            }
            3 => {
                if let Some(id) = pick(&ids, arg) {
                    sched.resume_task(id);
                }
            }
            4 => {
                if let Some(id) = pick(&ids, arg) {
                    sched.set_task_interval(id, u32::from(arg >> 2));
                }
            }
            5 => {
                if let Some(id) = pick(&ids, arg) {
                    let was_live = sched.contains(id);
                    if handle.remove(id).is_ok() {
                        sched.process_requests();
                        if was_live {
                            removed.push(id);
                        }
                    }
                }
            }
            _ => {
                clock.advance_ms(u32::from(arg));
                sched.update();

                let mut fired = runs.borrow_mut();
                let mut seen = fired.clone();
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), fired.len(), "task ran twice in one pass");
                for seq in fired.drain(..) {
                    assert!(!removed.contains(&ids[seq]), "removed task ran");
                }
            }
        }

        assert!(sched.len() <= CAP);
        for id in &removed {
            assert!(!sched.contains(*id));
        }
    }
});
