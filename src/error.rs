//! Error values for settlement cells.
//!
//! Failures inside the async machinery never escape as panics: every error a
//! handler, adoption attempt, or combinator produces becomes the rejection
//! reason of some cell. [`Error`] is the crate's own contribution to that
//! reason space; user callbacks are free to reject with any [`Value`].

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Failure raised by the settlement machinery, usable as a rejection reason
/// via [`Value::Error`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A cell was asked to adopt itself; honoring it would never settle.
    Cycle,
    /// Every input to `any` rejected. Reasons are aligned to the original
    /// input order, one slot per input.
    AllRejected(Vec<Value>),
    /// Free-form failure, typically raised from a user callback.
    Message(Rc<str>),
}

impl Error {
    /// Creates a [`Error::Message`] from anything string-like.
    pub fn msg(text: impl Into<Rc<str>>) -> Self {
        Self::Message(text.into())
    }

    /// The aggregated rejection reasons, for [`Error::AllRejected`].
    #[must_use]
    pub fn reasons(&self) -> Option<&[Value]> {
        match self {
            Self::AllRejected(reasons) => Some(reasons),
            Self::Cycle | Self::Message(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle => f.write_str("chaining cycle detected"),
            Self::AllRejected(reasons) => {
                write!(f, "all {} inputs rejected", reasons.len())
            }
            Self::Message(text) => f.write_str(text),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display() {
        assert_eq!(Error::Cycle.to_string(), "chaining cycle detected");
    }

    #[test]
    fn all_rejected_display_counts_reasons() {
        let error = Error::AllRejected(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(error.to_string(), "all 2 inputs rejected");
    }

    #[test]
    fn message_displays_text() {
        assert_eq!(Error::msg("boom").to_string(), "boom");
    }

    #[test]
    fn reasons_only_for_aggregates() {
        let aggregate = Error::AllRejected(vec![Value::Unit]);
        assert_eq!(aggregate.reasons(), Some(&[Value::Unit][..]));
        assert_eq!(Error::Cycle.reasons(), None);
        assert_eq!(Error::msg("x").reasons(), None);
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Error::msg("a"), Error::msg("a"));
        assert_ne!(Error::msg("a"), Error::msg("b"));
        assert_eq!(
            Error::AllRejected(vec![Value::Int(1)]),
            Error::AllRejected(vec![Value::Int(1)])
        );
    }
}
