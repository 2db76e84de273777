//! Deferred scheduler requests issued from inside task callbacks.
//!
//! A callback cannot borrow the [`Scheduler`](super::Scheduler) that is
//! running it.  Instead it holds a cloned [`SchedulerHandle`] and queues
//! requests; the scheduler applies them as soon as the callback returns,
//! before polling the next task.  Requests queued outside a dispatch pass
//! are applied at the start of the next pass.
//!
//! The queue is a single-context `Rc<RefCell<_>>`.  It is not an
//! interrupt-safe hand-off.

use core::cell::RefCell;
use std::rc::Rc;

use heapless::Deque;

use super::TaskId;
use crate::error::{Result, SchedulerError};

/// Maximum number of requests buffered between two drains.
pub const REQUEST_QUEUE_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
    Remove(TaskId),
    Pause(TaskId),
    Resume(TaskId),
    Report,
}

pub(crate) type RequestQueue = Rc<RefCell<Deque<Request, REQUEST_QUEUE_LEN>>>;

/// Cloneable, callback-safe front end to a scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    queue: RequestQueue,
}

impl SchedulerHandle {
    pub(crate) fn new(queue: RequestQueue) -> Self {
        Self { queue }
    }

    /// Remove a task.  Removing the task that is currently running is
    /// allowed; it never fires again.
    pub fn remove(&self, id: TaskId) -> Result<()> {
        self.push(Request::Remove(id))
    }

    pub fn pause(&self, id: TaskId) -> Result<()> {
        self.push(Request::Pause(id))
    }

    pub fn resume(&self, id: TaskId) -> Result<()> {
        self.push(Request::Resume(id))
    }

    /// Ask the scheduler to emit a CPU usage report to its report sink.
    pub fn request_report(&self) -> Result<()> {
        self.push(Request::Report)
    }

    /// Requests waiting to be applied.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn push(&self, request: Request) -> Result<()> {
        self.queue
            .borrow_mut()
            .push_back(request)
            .map_err(|_| SchedulerError::RequestQueueFull.into())
    }
}

impl core::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("pending", &self.pending())
            .finish()
    }
}
