//! The settlement cell: a single-assignment container for an eventual value.
//!
//! [`Promise`] is a cheap-to-clone handle onto one cell. A cell starts
//! pending, settles at most once — fulfilled with a value or rejected with a
//! reason — and is immutable afterwards. Continuations registered with
//! [`Promise::then`] run on the task queue once the cell settles, never
//! synchronously, even when the cell was already settled at registration
//! time.
//!
//! # Resolution
//!
//! Fulfilling a cell routes the candidate value through the resolution
//! procedure: same-kind cells and [`Thenable`](crate::value::Thenable)
//! implementations are *adopted* (the cell assumes their eventual state,
//! transitively), a cell resolved with itself rejects with
//! [`Error::Cycle`], and anything else is delivered as a plain value.
//! Rejection reasons are delivered as-is, with no adoption step.
//!
//! # Settle-once
//!
//! The state transition and the continuation drain happen under a single
//! `RefCell` borrow, so "settle exactly once, notify exactly once" holds even
//! under re-entrant settlement attempts from inside an executor or adoption
//! callback. Later attempts are no-ops, not errors.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::Error;
use crate::outcome::Outcome;
use crate::scheduler;
use crate::value::{SettleOnce, Value};

/// Settlement callback handed to an executor. Callable any number of times;
/// only the first effective call wins.
pub type SettleFn = Box<dyn Fn(Value)>;

/// A continuation handler: `Ok` feeds the returned value into the resolution
/// procedure targeting the downstream cell, `Err` rejects it. This is the
/// explicit-`Result` rendition of a callback that may raise.
pub type Handler = Box<dyn FnOnce(Value) -> Result<Value, Value>>;

thread_local! {
    static NEXT_CELL_ID: Cell<u64> = const { Cell::new(0) };
}

/// Per-thread identifier for one cell, for diagnostics and trace output only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell-{}", self.0)
    }
}

fn next_cell_id() -> CellId {
    NEXT_CELL_ID.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        CellId(id)
    })
}

/// Read-only view of a cell's lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet settled.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a rejection reason.
    Rejected,
}

impl Status {
    /// Returns `true` while the cell has not settled.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` once the cell fulfilled.
    #[must_use]
    pub const fn is_fulfilled(self) -> bool {
        matches!(self, Self::Fulfilled)
    }

    /// Returns `true` once the cell rejected.
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns `true` once the cell left the pending state.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !self.is_pending()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Fulfilled => f.write_str("fulfilled"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}

/// One registered continuation: the fulfillment and rejection actions of a
/// single `then` call. Exactly one of the two ever runs.
struct Continuation {
    on_fulfilled: SettleOnce,
    on_rejected: SettleOnce,
}

type Continuations = SmallVec<[Continuation; 2]>;

/// Tagged settlement state. Continuations exist only while pending.
enum State {
    Pending { continuations: Continuations },
    Fulfilled { value: Value },
    Rejected { reason: Value },
}

struct Inner {
    id: CellId,
    state: State,
}

/// A single-assignment settlement cell.
///
/// Clones are handles to the same cell: equality is identity, never
/// structural.
#[derive(Clone)]
pub struct Promise {
    inner: Rc<RefCell<Inner>>,
}

impl Promise {
    /// Creates a fresh, unsettled cell.
    #[must_use]
    pub fn pending() -> Self {
        let id = next_cell_id();
        tracing::trace!(id = %id, "cell created");
        Self {
            inner: Rc::new(RefCell::new(Inner {
                id,
                state: State::Pending {
                    continuations: Continuations::new(),
                },
            })),
        }
    }

    /// Creates a cell and invokes `executor` with its two settlement
    /// callbacks, synchronously and exactly once.
    ///
    /// The first callback resolves (routing thenables through the resolution
    /// procedure), the second rejects. Returning `Err` from the executor
    /// models a synchronous raise: the cell rejects with the raised value
    /// unless the executor already settled it — at-most-once settlement wins.
    pub fn new<E>(executor: E) -> Self
    where
        E: FnOnce(SettleFn, SettleFn) -> Result<(), Value>,
    {
        let cell = Self::pending();
        let resolve: SettleFn = {
            let target = cell.clone();
            Box::new(move |value| target.resolve_with(value))
        };
        let reject: SettleFn = {
            let target = cell.clone();
            Box::new(move |reason| target.reject_with(reason))
        };
        if let Err(raised) = executor(resolve, reject) {
            cell.reject_with(raised);
        }
        cell
    }

    /// Returns `value` itself when it is already a cell; otherwise a new cell
    /// resolved with it (adopting foreign thenables, fulfilling plain values
    /// immediately).
    pub fn resolve(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Cell(cell) => cell,
            other => {
                let cell = Self::pending();
                cell.resolve_with(other);
                cell
            }
        }
    }

    /// A new cell immediately rejected with `reason`. No adoption step:
    /// reasons are delivered as-is, thenable or not.
    pub fn reject(reason: impl Into<Value>) -> Self {
        let cell = Self::pending();
        cell.reject_with(reason.into());
        cell
    }

    /// This cell's diagnostic identifier.
    #[must_use]
    pub fn id(&self) -> CellId {
        self.inner.borrow().id
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn status(&self) -> Status {
        match self.inner.borrow().state {
            State::Pending { .. } => Status::Pending,
            State::Fulfilled { .. } => Status::Fulfilled,
            State::Rejected { .. } => Status::Rejected,
        }
    }

    /// The settled value or reason, if the cell has settled.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match &self.inner.borrow().state {
            State::Pending { .. } => None,
            State::Fulfilled { value } => Some(Outcome::Fulfilled(value.clone())),
            State::Rejected { reason } => Some(Outcome::Rejected(reason.clone())),
        }
    }

    /// Returns `true` if `self` and `other` are handles to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers a continuation and returns its downstream cell.
    ///
    /// Both handlers take the settled value/reason; `Ok` resolves the
    /// downstream cell with the returned value (adopting thenables), `Err`
    /// rejects it. Handlers run on the task queue, never synchronously:
    /// a `then` on an already-settled source still defers.
    pub fn then<F, R>(&self, on_fulfilled: F, on_rejected: R) -> Self
    where
        F: FnOnce(Value) -> Result<Value, Value> + 'static,
        R: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        self.subscribe(Some(Box::new(on_fulfilled)), Some(Box::new(on_rejected)))
    }

    /// Registers a rejection handler only; fulfillment passes through
    /// unchanged. Equivalent to `then` with an identity fulfillment handler.
    pub fn catch<R>(&self, on_rejected: R) -> Self
    where
        R: FnOnce(Value) -> Result<Value, Value> + 'static,
    {
        self.subscribe(None, Some(Box::new(on_rejected)))
    }

    /// Runs `on_finally` with no argument once this cell settles, on either
    /// path, then forwards the original value or reason.
    ///
    /// If `on_finally` returns a thenable, forwarding waits for it to settle.
    /// If `on_finally` raises (`Err`) or its thenable rejects, that failure
    /// overrides the original outcome.
    pub fn finally<F>(&self, on_finally: F) -> Self
    where
        F: Fn() -> Result<Value, Value> + 'static,
    {
        let on_finally = Rc::new(on_finally);
        let for_rejection = Rc::clone(&on_finally);
        self.then(
            move |value| {
                let follow = on_finally()?;
                Ok(Value::Cell(
                    Self::resolve(follow).then(move |_| Ok(value), |raised| Err(raised)),
                ))
            },
            move |reason| {
                let follow = for_rejection()?;
                Ok(Value::Cell(
                    Self::resolve(follow).then(move |_| Err(reason), |raised| Err(raised)),
                ))
            },
        )
    }

    /// `then` with omitted handlers normalized: identity for fulfillment,
    /// rethrow for rejection.
    fn subscribe(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Self {
        let downstream = Self::pending();
        let on_fulfilled = on_fulfilled.unwrap_or_else(|| Box::new(|value| Ok(value)));
        let on_rejected = on_rejected.unwrap_or_else(|| Box::new(|reason| Err(reason)));
        self.register(
            run_handler(downstream.clone(), on_fulfilled),
            run_handler(downstream.clone(), on_rejected),
        );
        downstream
    }

    /// Resolution procedure: delivers `result` into this cell.
    ///
    /// Same-kind cells are adopted by continuation, with a self-adoption
    /// check; foreign thenables are adopted through [`Thenable::subscribe`]
    /// behind a shared first-call-wins guard; plain values fulfill directly.
    ///
    /// [`Thenable::subscribe`]: crate::value::Thenable::subscribe
    pub(crate) fn resolve_with(&self, result: Value) {
        match result {
            Value::Cell(source) => {
                if source.ptr_eq(self) {
                    tracing::trace!(id = %self.id(), "cell resolved with itself");
                    self.reject_with(Value::Error(Error::Cycle));
                    return;
                }
                tracing::trace!(id = %self.id(), source = %source.id(), "adopting cell");
                let on_fulfilled: SettleOnce = {
                    let target = self.clone();
                    // Re-run resolution: the adopted value may itself be a thenable.
                    Box::new(move |value| target.resolve_with(value))
                };
                let on_rejected: SettleOnce = {
                    let target = self.clone();
                    Box::new(move |reason| target.reject_with(reason))
                };
                source.register(on_fulfilled, on_rejected);
            }
            Value::Foreign(thenable) => {
                tracing::trace!(id = %self.id(), "adopting foreign thenable");
                let called = Rc::new(Cell::new(false));
                let on_fulfilled: SettleOnce = {
                    let target = self.clone();
                    let called = Rc::clone(&called);
                    Box::new(move |value| {
                        if !called.replace(true) {
                            target.resolve_with(value);
                        }
                    })
                };
                let on_rejected: SettleOnce = {
                    let target = self.clone();
                    let called = Rc::clone(&called);
                    Box::new(move |reason| {
                        if !called.replace(true) {
                            target.reject_with(reason);
                        }
                    })
                };
                if let Err(raised) = thenable.subscribe(on_fulfilled, on_rejected) {
                    // A raise after a callback already fired is ignored.
                    if !called.replace(true) {
                        self.reject_with(raised);
                    }
                }
            }
            plain => self.fulfill_with(plain),
        }
    }

    /// Direct `Pending → Rejected` transition; no-op once settled.
    pub(crate) fn reject_with(&self, reason: Value) {
        let drained = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, State::Pending { .. }) {
                return;
            }
            let previous = std::mem::replace(
                &mut inner.state,
                State::Rejected {
                    reason: reason.clone(),
                },
            );
            let State::Pending { continuations } = previous else {
                unreachable!("pending state checked above");
            };
            tracing::trace!(id = %inner.id, waiters = continuations.len(), "cell rejected");
            continuations
        };
        for continuation in drained {
            (continuation.on_rejected)(reason.clone());
        }
    }

    /// Direct `Pending → Fulfilled` transition for plain values; no-op once
    /// settled. Thenable candidates must go through [`Promise::resolve_with`].
    fn fulfill_with(&self, value: Value) {
        let drained = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, State::Pending { .. }) {
                return;
            }
            let previous = std::mem::replace(
                &mut inner.state,
                State::Fulfilled {
                    value: value.clone(),
                },
            );
            let State::Pending { continuations } = previous else {
                unreachable!("pending state checked above");
            };
            tracing::trace!(id = %inner.id, waiters = continuations.len(), "cell fulfilled");
            continuations
        };
        for continuation in drained {
            (continuation.on_fulfilled)(value.clone());
        }
    }

    /// Attaches a continuation, firing the matching action immediately when
    /// the cell has already settled.
    ///
    /// The actions themselves carry the deferral: everything reaching user
    /// code bounces through the task queue via [`run_handler`].
    fn register(&self, on_fulfilled: SettleOnce, on_rejected: SettleOnce) {
        let ready = {
            let mut inner = self.inner.borrow_mut();
            match &mut inner.state {
                State::Pending { continuations } => {
                    continuations.push(Continuation {
                        on_fulfilled,
                        on_rejected,
                    });
                    None
                }
                State::Fulfilled { value } => Some((on_fulfilled, value.clone())),
                State::Rejected { reason } => Some((on_rejected, reason.clone())),
            }
        };
        if let Some((action, settled)) = ready {
            action(settled);
        }
    }
}

impl PartialEq for Promise {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Promise {}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Promise({} {})", self.id(), self.status())
    }
}

impl fmt::Display for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.id(), self.status())
    }
}

/// Wraps a user handler so that, once the source settles, the handler runs on
/// the task queue and its result lands in `downstream`.
fn run_handler(downstream: Promise, handler: Handler) -> SettleOnce {
    Box::new(move |input| {
        scheduler::schedule(Box::new(move || match handler(input) {
            Ok(value) => downstream.resolve_with(value),
            Err(reason) => downstream.reject_with(reason),
        }));
    })
}
