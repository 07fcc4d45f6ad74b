//! First settlement wins, whichever way it went.

use crate::combinator::normalized;
use crate::promise::Promise;
use crate::value::Value;

impl Promise {
    /// Settles exactly like the first input to settle: fulfilled with its
    /// value or rejected with its reason.
    ///
    /// Later settlements lose to the derived cell's at-most-once guarantee.
    /// An empty iterable yields a cell that never settles — there is nothing
    /// to win the race.
    #[must_use]
    pub fn race<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let result = Self::pending();
        for source in normalized(inputs) {
            let fulfill_target = result.clone();
            let reject_target = result.clone();
            source.then(
                move |value| {
                    fulfill_target.resolve_with(value);
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

#[cfg(test)]
mod tests {
    use crate::outcome::Outcome;
    use crate::promise::Promise;
    use crate::scheduler::run_until_idle;
    use crate::value::Value;

    #[test]
    fn empty_input_never_settles() {
        let raced = Promise::race(Vec::new());
        run_until_idle();
        assert!(raced.status().is_pending());
    }

    #[test]
    fn first_fulfillment_wins() {
        let fast = Promise::pending();
        let slow = Promise::pending();
        let raced = Promise::race(vec![Value::Cell(slow.clone()), Value::Cell(fast.clone())]);

        fast.resolve_with(Value::text("fast"));
        run_until_idle();
        slow.resolve_with(Value::text("slow"));
        run_until_idle();

        assert_eq!(
            raced.outcome(),
            Some(Outcome::Fulfilled(Value::text("fast")))
        );
    }

    #[test]
    fn first_rejection_wins_too() {
        let failing = Promise::pending();
        let healthy = Promise::pending();
        let raced = Promise::race(vec![
            Value::Cell(failing.clone()),
            Value::Cell(healthy.clone()),
        ]);

        failing.reject_with(Value::text("lost"));
        run_until_idle();
        healthy.resolve_with(Value::Int(1));
        run_until_idle();

        assert_eq!(raced.outcome(), Some(Outcome::Rejected(Value::text("lost"))));
    }

    #[test]
    fn plain_values_win_in_input_order() {
        let raced = Promise::race(vec![Value::Int(1), Value::Int(2)]);
        run_until_idle();
        assert_eq!(raced.outcome(), Some(Outcome::Fulfilled(Value::Int(1))));
    }
}
