//! Test utilities for settled.
//!
//! This module provides shared helpers for unit and integration tests:
//! - Consistent tracing-based logging initialization
//! - A drain helper for the default task queue
//! - A job-capturing scheduler for scheduling-contract tests
//! - Settlement assertion macros
//!
//! # Example
//! ```
//! use settled::test_utils::{drain, init_test_logging};
//! use settled::{Promise, Value};
//!
//! init_test_logging();
//! let cell = Promise::resolve(Value::Int(1));
//! let next = cell.then(|v| Ok(v), |r| Err(r));
//! drain();
//! settled::assert_fulfilled_eq!(next, 1i64);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use tracing_subscriber::fmt::format::FmtSpan;

use crate::scheduler::{self, Job, Scheduler};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Runs the default task queue until idle, returning the number of jobs run.
pub fn drain() -> usize {
    scheduler::run_until_idle()
}

/// Scheduler that captures jobs instead of queueing them, so a test can
/// observe and release deferred work explicitly.
///
/// Install with [`scheduler::install`]; remember to
/// [`scheduler::uninstall`] before the test ends.
#[derive(Default)]
pub struct CapturingScheduler {
    jobs: RefCell<Vec<Job>>,
}

impl CapturingScheduler {
    /// Creates an empty capturing scheduler behind an `Rc`, ready to install.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of jobs captured and not yet released.
    #[must_use]
    pub fn captured(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// Runs every captured job in capture order, returning how many ran.
    ///
    /// Jobs scheduled while releasing are captured for the next release.
    pub fn release_all(&self) -> usize {
        let jobs = self.jobs.take();
        let ran = jobs.len();
        for job in jobs {
            job();
        }
        ran
    }
}

impl Scheduler for CapturingScheduler {
    fn schedule(&self, job: Job) {
        self.jobs.borrow_mut().push(job);
    }
}

/// Asserts that a cell has fulfilled with the expected value.
#[macro_export]
macro_rules! assert_fulfilled_eq {
    ($cell:expr, $expected:expr) => {
        match $cell.outcome() {
            Some($crate::Outcome::Fulfilled(value)) => {
                assert_eq!(value, $crate::Value::from($expected));
            }
            other => unreachable!("expected a fulfilled cell, got {:?}", other),
        }
    };
}

/// Asserts that a cell has rejected; with a second argument, also checks the
/// reason.
#[macro_export]
macro_rules! assert_rejected {
    ($cell:expr) => {
        match $cell.outcome() {
            Some($crate::Outcome::Rejected(_)) => {}
            other => unreachable!("expected a rejected cell, got {:?}", other),
        }
    };
    ($cell:expr, $expected:expr) => {
        match $cell.outcome() {
            Some($crate::Outcome::Rejected(reason)) => {
                assert_eq!(reason, $crate::Value::from($expected));
            }
            other => unreachable!("expected a rejected cell, got {:?}", other),
        }
    };
}

/// Asserts that a cell has not settled.
#[macro_export]
macro_rules! assert_still_pending {
    ($cell:expr) => {
        assert!(
            $cell.status().is_pending(),
            "expected a pending cell, got {:?}",
            $cell.outcome()
        );
    };
}
