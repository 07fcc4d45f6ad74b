//! Wait for every input; report each settlement, never fail.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::combinator::normalized;
use crate::outcome::Outcome;
use crate::promise::Promise;
use crate::value::Value;

impl Promise {
    /// Settles fulfilled — always — with one [`Outcome`] per input once every
    /// input has settled either way.
    ///
    /// Slot `i` of the result list reports input `i`'s settlement no matter
    /// when it happened. An empty iterable fulfills immediately with an empty
    /// list. The derived cell never rejects.
    #[must_use]
    pub fn all_settled<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let sources = normalized(inputs);
        let result = Self::pending();
        if sources.is_empty() {
            result.resolve_with(Value::list(Vec::new()));
            return result;
        }

        let slots: Rc<RefCell<Vec<Option<Outcome>>>> =
            Rc::new(RefCell::new(vec![None; sources.len()]));
        let remaining = Rc::new(Cell::new(sources.len()));

        for (index, source) in sources.into_iter().enumerate() {
            let record = {
                let slots = Rc::clone(&slots);
                let remaining = Rc::clone(&remaining);
                let target = result.clone();
                move |outcome: Outcome| {
                    slots.borrow_mut()[index] = Some(outcome);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let reports: Vec<Value> = slots
                            .borrow_mut()
                            .drain(..)
                            .map(|slot| {
                                Value::from(slot.expect("every slot is filled at zero remaining"))
                            })
                            .collect();
                        target.resolve_with(Value::list(reports));
                    }
                }
            };
            let record_rejection = record.clone();
            source.then(
                move |value| {
                    record(Outcome::Fulfilled(value));
                    Ok(Value::Unit)
                },
                move |reason| {
                    record_rejection(Outcome::Rejected(reason));
                    Ok(Value::Unit)
                },
            );
        }
        result
    }
}
