//! Settled: single-assignment settlement cells with chained continuations
//! and cooperative task-queue scheduling.
//!
//! # Overview
//!
//! A [`Promise`] is a settlement cell: the single-assignment holder for the
//! eventual result of a deferred computation. A cell starts pending, settles
//! at most once — fulfilled with a [`Value`] or rejected with a reason — and
//! is immutable afterwards. Chaining ([`Promise::then`], [`Promise::catch`],
//! [`Promise::finally`]) and the aggregation combinators ([`Promise::all`],
//! [`Promise::all_settled`], [`Promise::race`], [`Promise::any`]) are built
//! on two pieces of machinery: the settle-once state machine and the
//! resolution procedure that adopts thenable values transitively.
//!
//! # Core Guarantees
//!
//! - **Settle exactly once**: later settlement attempts are no-ops, never
//!   errors; the first effective call wins
//! - **Notify exactly once**: pending continuations drain in insertion order
//!   at the moment of transition, and only then
//! - **Always deferred**: user handlers run on the task queue, never on the
//!   stack frame that settled the source — even for already-settled sources
//! - **No escaping failures**: a raise inside a handler, executor, or
//!   adoption attempt becomes a rejection, never a panic out of the machinery
//! - **Positional results**: combinator results are aligned to input order,
//!   not completion order
//!
//! # Scheduling Model
//!
//! Single-threaded cooperative scheduling. Nothing blocks; "suspension" is a
//! still-pending cell. Deferred work goes to a per-thread FIFO
//! [`scheduler::TaskQueue`] drained with [`scheduler::run_until_idle`], or to
//! a custom [`scheduler::Scheduler`] installed by the embedding environment.
//! There is no cancellation: a registered continuation runs when (and only
//! when) its source settles.
//!
//! # Module Structure
//!
//! - [`promise`]: the settlement cell, resolution procedure, and chaining
//! - [`value`]: dynamic value domain and the [`Thenable`] adoption trait
//! - [`scheduler`]: the task-queue abstraction and default FIFO queue
//! - [`combinator`]: `all`, `all_settled`, `race`, `any`
//! - [`outcome`]: per-input settlement reports
//! - [`error`]: machinery-level failure values
//! - [`deferred`]: manual settlement outside an executor
//! - [`test_utils`]: logging setup, drain helper, assertion macros
//!
//! # Example
//!
//! ```
//! use settled::{scheduler, Promise, Value};
//!
//! let cell = Promise::new(|resolve, _reject| {
//!     resolve(Value::Int(41));
//!     Ok(())
//! });
//! let answer = cell.then(
//!     |v| Ok(Value::Int(v.as_int().expect("int input") + 1)),
//!     |reason| Err(reason),
//! );
//!
//! // Nothing has run yet: handlers are always deferred.
//! assert!(answer.status().is_pending());
//! scheduler::run_until_idle();
//! assert_eq!(
//!     answer.outcome(),
//!     Some(settled::Outcome::Fulfilled(Value::Int(42)))
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::redundant_closure)]

pub mod combinator;
pub mod deferred;
pub mod error;
pub mod outcome;
pub mod promise;
pub mod scheduler;
pub mod test_utils;
pub mod value;

pub use deferred::Deferred;
pub use error::Error;
pub use outcome::Outcome;
pub use promise::{CellId, Handler, Promise, SettleFn, Status};
pub use value::{SettleOnce, Thenable, Value};
