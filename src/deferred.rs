//! Manual settlement outside an executor.
//!
//! [`Deferred`] is a convenience for callers (and tests) that want a cell and
//! its two settlement callbacks as separate handles, without structuring
//! their code as an executor closure. It is built entirely on the public
//! [`Promise::new`] contract; the core never uses it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::promise::{Promise, SettleFn};
use crate::value::Value;

/// A cell paired with its own settlement callbacks.
pub struct Deferred {
    promise: Promise,
    resolve: SettleFn,
    reject: SettleFn,
}

impl Deferred {
    /// Creates a pending cell and captures its settlement callbacks.
    #[must_use]
    pub fn new() -> Self {
        let captured: Rc<RefCell<Option<(SettleFn, SettleFn)>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&captured);
        let promise = Promise::new(move |resolve, reject| {
            *slot.borrow_mut() = Some((resolve, reject));
            Ok(())
        });
        let (resolve, reject) = captured
            .borrow_mut()
            .take()
            .expect("executor runs synchronously");
        Self {
            promise,
            resolve,
            reject,
        }
    }

    /// A handle to the underlying cell.
    #[must_use]
    pub fn promise(&self) -> Promise {
        self.promise.clone()
    }

    /// Resolves the cell (first effective settlement wins).
    pub fn resolve(&self, value: impl Into<Value>) {
        (self.resolve)(value.into());
    }

    /// Rejects the cell (first effective settlement wins).
    pub fn reject(&self, reason: impl Into<Value>) {
        (self.reject)(reason.into());
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("promise", &self.promise)
            .finish()
    }
}
