//! Wait for every input; fail fast on the first rejection.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::combinator::normalized;
use crate::promise::Promise;
use crate::value::Value;

impl Promise {
    /// Settles fulfilled with a list of every input's value once all inputs
    /// fulfill, or rejected with the first rejection's reason.
    ///
    /// The result list is positionally aligned to the input order: slot `i`
    /// holds input `i`'s value no matter when it settled. An empty iterable
    /// fulfills immediately with an empty list. After the first rejection the
    /// remaining inputs keep running (there is no cancellation), but their
    /// settlements no longer affect the result.
    #[must_use]
    pub fn all<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let sources = normalized(inputs);
        let result = Self::pending();
        if sources.is_empty() {
            result.resolve_with(Value::list(Vec::new()));
            return result;
        }

        let slots: Rc<RefCell<Vec<Option<Value>>>> =
            Rc::new(RefCell::new(vec![None; sources.len()]));
        let remaining = Rc::new(Cell::new(sources.len()));

        for (index, source) in sources.into_iter().enumerate() {
            let slots = Rc::clone(&slots);
            let remaining = Rc::clone(&remaining);
            let fulfill_target = result.clone();
            let reject_target = result.clone();
            source.then(
                move |value| {
                    slots.borrow_mut()[index] = Some(value);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let values: Vec<Value> = slots
                            .borrow_mut()
                            .drain(..)
                            .map(|slot| slot.expect("every slot is filled at zero remaining"))
                            .collect();
                        fulfill_target.resolve_with(Value::list(values));
                    }
                    Ok(Value::Unit)
                },
                move |reason| {
                    reject_target.reject_with(reason);
                    Ok(Value::Unit)
                },
            );
        }
        result
    }
}
