//! Task-queue abstraction for deferred continuation execution.
//!
//! Every continuation a cell runs — fulfillment handlers, rejection handlers,
//! `finally` callbacks — is bounced through a scheduler rather than invoked
//! inline. This is what makes the chaining contract hold: a handler never
//! observes the stack frame that settled its source, even when the source was
//! already settled at registration time.
//!
//! The default scheduler is a per-thread FIFO [`TaskQueue`], drained
//! cooperatively with [`run_until_idle`]. An embedding environment with its
//! own event loop can [`install`] a custom [`Scheduler`] instead; the crate's
//! ordering guarantees hold for any implementation that runs jobs in
//! first-scheduled-first-run order.
//!
//! # Ordering
//!
//! Jobs scheduled against the same queue run in the order they were
//! scheduled. Jobs scheduled *while draining* are appended and run in the
//! same drain, after everything already queued.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce()>;

/// Destination for deferred work.
///
/// Implementations must run jobs at most once each, after the current
/// synchronous execution unwinds, preserving scheduling order.
pub trait Scheduler {
    /// Accepts a job to run later.
    fn schedule(&self, job: Job);
}

/// The default cooperative FIFO queue.
///
/// Single-threaded: jobs are pushed by [`Scheduler::schedule`] and run only
/// when the owner calls [`TaskQueue::run_until_idle`]. Nested drain attempts
/// (a job calling back into the drain) are no-ops; the outer drain picks up
/// whatever the job scheduled.
pub struct TaskQueue {
    jobs: RefCell<VecDeque<Job>>,
    draining: Cell<bool>,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
        }
    }

    /// Number of jobs waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// Returns `true` if no jobs are waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.jobs.borrow().is_empty()
    }

    /// Runs queued jobs in FIFO order until the queue is empty.
    ///
    /// Jobs scheduled by running jobs are drained too. Returns the number of
    /// jobs run; returns 0 immediately when called from within a running job.
    pub fn run_until_idle(&self) -> usize {
        if self.draining.replace(true) {
            return 0;
        }
        let mut ran = 0usize;
        loop {
            // The borrow must end before the job runs: jobs schedule more jobs.
            let job = self.jobs.borrow_mut().pop_front();
            let Some(job) = job else { break };
            job();
            ran += 1;
        }
        self.draining.set(false);
        tracing::trace!(jobs = ran, "task queue drained");
        ran
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, job: Job) {
        self.jobs.borrow_mut().push_back(job);
        tracing::trace!(pending = self.pending(), "job scheduled");
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static DEFAULT_QUEUE: Rc<TaskQueue> = Rc::new(TaskQueue::new());
    static CURRENT: RefCell<Option<Rc<dyn Scheduler>>> = const { RefCell::new(None) };
}

/// Schedules a job on the current scheduler.
///
/// Routes to the installed scheduler if there is one, otherwise to the
/// thread's default [`TaskQueue`].
pub fn schedule(job: Job) {
    let installed = CURRENT.with(|current| current.borrow().clone());
    match installed {
        Some(scheduler) => scheduler.schedule(job),
        None => DEFAULT_QUEUE.with(|queue| queue.schedule(job)),
    }
}

/// Installs a custom scheduler for the current thread, returning the one it
/// replaces (if any).
///
/// Driving an installed scheduler is its owner's job; [`run_until_idle`]
/// only ever drains the default queue.
pub fn install(scheduler: Rc<dyn Scheduler>) -> Option<Rc<dyn Scheduler>> {
    CURRENT.with(|current| current.borrow_mut().replace(scheduler))
}

/// Removes the installed scheduler, restoring the default queue.
pub fn uninstall() -> Option<Rc<dyn Scheduler>> {
    CURRENT.with(|current| current.borrow_mut().take())
}

/// Drains the thread's default queue. See [`TaskQueue::run_until_idle`].
pub fn run_until_idle() -> usize {
    DEFAULT_QUEUE.with(|queue| queue.run_until_idle())
}

/// Number of jobs waiting on the thread's default queue.
#[must_use]
pub fn pending() -> usize {
    DEFAULT_QUEUE.with(|queue| queue.pending())
}
