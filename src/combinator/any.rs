//! First fulfillment wins; an aggregate error if nothing fulfills.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::combinator::normalized;
use crate::error::Error;
use crate::promise::Promise;
use crate::value::Value;

impl Promise {
    /// Settles fulfilled with the first input to fulfill, or — only once
    /// every input has rejected — rejected with [`Error::AllRejected`]
    /// wrapping each input's reason, positionally aligned.
    ///
    /// An empty iterable rejects immediately with an empty aggregate: there
    /// is no input that could ever fulfill.
    #[must_use]
    pub fn any<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let sources = normalized(inputs);
        let result = Self::pending();
        if sources.is_empty() {
            result.reject_with(Value::Error(Error::AllRejected(Vec::new())));
            return result;
        }

        let reasons: Rc<RefCell<Vec<Option<Value>>>> =
            Rc::new(RefCell::new(vec![None; sources.len()]));
        let remaining = Rc::new(Cell::new(sources.len()));

        for (index, source) in sources.into_iter().enumerate() {
            let reasons = Rc::clone(&reasons);
            let remaining = Rc::clone(&remaining);
            let fulfill_target = result.clone();
            let reject_target = result.clone();
            source.then(
                move |value| {
                    fulfill_target.resolve_with(value);
                    Ok(Value::Unit)
                },
                move |reason| {
                    reasons.borrow_mut()[index] = Some(reason);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let collected: Vec<Value> = reasons
                            .borrow_mut()
                            .drain(..)
                            .map(|slot| slot.expect("every slot is filled at zero remaining"))
                            .collect();
                        reject_target.reject_with(Value::Error(Error::AllRejected(collected)));
                    }
                    Ok(Value::Unit)
                },
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::outcome::Outcome;
    use crate::promise::Promise;
    use crate::scheduler::run_until_idle;
    use crate::value::Value;

    #[test]
    fn empty_input_rejects_with_empty_aggregate() {
        let chosen = Promise::any(Vec::new());
        assert_eq!(
            chosen.outcome(),
            Some(Outcome::Rejected(Value::Error(Error::AllRejected(
                Vec::new()
            ))))
        );
    }

    #[test]
    fn first_fulfillment_wins_over_earlier_rejections() {
        let failing = Promise::reject(Value::text("bad"));
        let healthy = Promise::pending();
        let chosen = Promise::any(vec![Value::Cell(failing), Value::Cell(healthy.clone())]);

        run_until_idle();
        assert!(chosen.status().is_pending());

        healthy.resolve_with(Value::Int(5));
        run_until_idle();
        assert_eq!(chosen.outcome(), Some(Outcome::Fulfilled(Value::Int(5))));
    }

    #[test]
    fn all_rejections_aggregate_in_input_order() {
        let first = Promise::pending();
        let second = Promise::pending();
        let chosen = Promise::any(vec![Value::Cell(first.clone()), Value::Cell(second.clone())]);

        // Reject in reverse input order; the aggregate still aligns by index.
        second.reject_with(Value::text("two"));
        run_until_idle();
        first.reject_with(Value::text("one"));
        run_until_idle();

        assert_eq!(
            chosen.outcome(),
            Some(Outcome::Rejected(Value::Error(Error::AllRejected(vec![
                Value::text("one"),
                Value::text("two"),
            ]))))
        );
    }

    #[test]
    fn late_rejections_after_a_win_are_ignored() {
        let winner = Promise::pending();
        let loser = Promise::pending();
        let chosen = Promise::any(vec![Value::Cell(winner.clone()), Value::Cell(loser.clone())]);

        winner.resolve_with(Value::Int(1));
        run_until_idle();
        loser.reject_with(Value::text("late"));
        run_until_idle();

        assert_eq!(chosen.outcome(), Some(Outcome::Fulfilled(Value::Int(1))));
    }
}
