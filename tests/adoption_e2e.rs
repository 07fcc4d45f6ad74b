//! End-to-end foreign-thenable adoption scenarios.
//!
//! Exercises the resolution procedure against externally-implemented
//! thenables: well-behaved ones, ones that settle both ways, ones that raise
//! synchronously, and ones that chain into further thenables. The shared
//! first-call-wins guard must make all of them safe to adopt.

use std::cell::RefCell;
use std::rc::Rc;

use settled::test_utils::{drain, init_test_logging};
use settled::{assert_fulfilled_eq, assert_rejected, assert_still_pending};
use settled::{Promise, SettleOnce, Thenable, Value};

/// Fulfills immediately from inside `subscribe`.
struct SettlesNow {
    value: Value,
}

impl Thenable for SettlesNow {
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        _on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        on_fulfilled(self.value.clone());
        Ok(())
    }
}

/// Rejects immediately from inside `subscribe`.
struct RejectsNow {
    reason: Value,
}

impl Thenable for RejectsNow {
    fn subscribe(
        self: Rc<Self>,
        _on_fulfilled: SettleOnce,
        on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        on_rejected(self.reason.clone());
        Ok(())
    }
}

/// Misbehaves: fires the fulfillment callback, then the rejection callback.
struct CallsBothWays;

impl Thenable for CallsBothWays {
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        on_fulfilled(Value::Int(1));
        on_rejected(Value::text("too late"));
        Ok(())
    }
}

/// Misbehaves: settles, then raises synchronously.
struct SettlesThenRaises;

impl Thenable for SettlesThenRaises {
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        _on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        on_fulfilled(Value::Int(2));
        Err(Value::text("raised after settling"))
    }
}

/// Raises synchronously without touching either callback.
struct RaisesImmediately;

impl Thenable for RaisesImmediately {
    fn subscribe(
        self: Rc<Self>,
        _on_fulfilled: SettleOnce,
        _on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        Err(Value::text("sync raise"))
    }
}

/// Stores the callbacks and settles only when the test says so.
#[derive(Default)]
struct SettlesOnDemand {
    callbacks: RefCell<Option<(SettleOnce, SettleOnce)>>,
}

impl SettlesOnDemand {
    fn fulfill(&self, value: Value) {
        if let Some((on_fulfilled, _)) = self.callbacks.borrow_mut().take() {
            on_fulfilled(value);
        }
    }

    fn reject(&self, reason: Value) {
        if let Some((_, on_rejected)) = self.callbacks.borrow_mut().take() {
            on_rejected(reason);
        }
    }
}

impl Thenable for SettlesOnDemand {
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        *self.callbacks.borrow_mut() = Some((on_fulfilled, on_rejected));
        Ok(())
    }
}

/// Fulfills with another thenable, forcing transitive adoption.
struct ChainsDeeper;

impl Thenable for ChainsDeeper {
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        _on_rejected: SettleOnce,
    ) -> Result<(), Value> {
        on_fulfilled(Value::foreign(SettlesNow {
            value: Value::text("bottom"),
        }));
        Ok(())
    }
}

#[test]
fn resolve_adopts_a_fulfilling_thenable() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(SettlesNow {
        value: Value::Int(5),
    }));
    assert_fulfilled_eq!(cell, 5i64);
}

#[test]
fn resolve_adopts_a_rejecting_thenable() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(RejectsNow {
        reason: Value::text("no"),
    }));
    assert_rejected!(cell, "no");
}

#[test]
fn only_the_first_callback_counts() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(CallsBothWays));
    assert_fulfilled_eq!(cell, 1i64);
}

#[test]
fn a_raise_after_settling_is_ignored() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(SettlesThenRaises));
    assert_fulfilled_eq!(cell, 2i64);
}

#[test]
fn a_raise_before_settling_rejects() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(RaisesImmediately));
    assert_rejected!(cell, "sync raise");
}

#[test]
fn adoption_waits_for_an_on_demand_thenable() {
    init_test_logging();
    let manual = Rc::new(SettlesOnDemand::default());
    let cell = Promise::resolve(Value::Foreign(Rc::clone(&manual) as Rc<dyn Thenable>));

    assert_still_pending!(cell);
    manual.fulfill(Value::Int(9));
    assert_fulfilled_eq!(cell, 9i64);
}

#[test]
fn on_demand_rejection_reaches_the_adopter() {
    init_test_logging();
    let manual = Rc::new(SettlesOnDemand::default());
    let cell = Promise::resolve(Value::Foreign(Rc::clone(&manual) as Rc<dyn Thenable>));

    manual.reject(Value::text("later failure"));
    assert_rejected!(cell, "later failure");
}

#[test]
fn nested_thenables_adopt_transitively() {
    init_test_logging();
    let cell = Promise::resolve(Value::foreign(ChainsDeeper));
    assert_fulfilled_eq!(cell, "bottom");
}

#[test]
fn handler_returning_a_thenable_is_adopted() {
    init_test_logging();
    let chained = Promise::resolve(Value::Unit).then(
        |_| {
            Ok(Value::foreign(SettlesNow {
                value: Value::Int(3),
            }))
        },
        |r| Err(r),
    );
    drain();
    assert_fulfilled_eq!(chained, 3i64);
}

#[test]
fn thenables_work_as_combinator_inputs() {
    init_test_logging();
    let combined = Promise::all(vec![
        Value::foreign(SettlesNow {
            value: Value::Int(1),
        }),
        Value::Int(2),
    ]);
    drain();
    assert_fulfilled_eq!(combined, Value::list(vec![Value::Int(1), Value::Int(2)]));
}

#[test]
fn rejecting_thenable_short_circuits_all() {
    init_test_logging();
    let combined = Promise::all(vec![
        Value::Cell(Promise::pending()),
        Value::foreign(RejectsNow {
            reason: Value::text("bad input"),
        }),
    ]);
    drain();
    assert_rejected!(combined, "bad input");
}
