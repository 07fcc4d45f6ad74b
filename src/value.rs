//! Dynamic value domain for settlement cells.
//!
//! A cell can settle with anything: primitives, lists, error values, other
//! cells, or externally-implemented thenables. [`Value`] is the closed sum of
//! those possibilities; the resolution procedure pattern-matches it to decide
//! between adoption and plain delivery.
//!
//! # Equality
//!
//! Data variants compare structurally. [`Value::Cell`] and [`Value::Foreign`]
//! compare by identity — two cells are equal only when they are the same
//! cell, never when they merely hold equal contents.

use std::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::outcome::Outcome;
use crate::promise::Promise;

/// Single-shot settlement callback handed to a [`Thenable`].
pub type SettleOnce = Box<dyn FnOnce(Value)>;

/// An externally-implemented deferred value that a cell can adopt.
///
/// This is the crate's rendition of "any object with a callable `then`":
/// instead of probing members at runtime, a foreign value participates in
/// resolution by implementing this trait and appearing as [`Value::Foreign`].
///
/// # Contract
///
/// `subscribe` receives one fulfillment and one rejection callback. A
/// well-behaved implementation eventually invokes exactly one of them,
/// exactly once — but the resolution procedure does not rely on good
/// behavior: the callbacks share a first-call-wins guard, so calling both,
/// or one of them twice, has no further effect. Returning `Err` models a
/// synchronous raise while invoking `then`; it is honored only if neither
/// callback has fired yet.
pub trait Thenable {
    /// Registers the two settlement callbacks with this thenable.
    fn subscribe(
        self: Rc<Self>,
        on_fulfilled: SettleOnce,
        on_rejected: SettleOnce,
    ) -> Result<(), Value>;
}

/// A value a settlement cell can hold or be resolved with.
#[derive(Clone)]
pub enum Value {
    /// The no-value value; what handlers without anything to say return.
    Unit,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Immutable text.
    Text(Rc<str>),
    /// Ordered sequence of values.
    List(Rc<Vec<Value>>),
    /// A machinery-level failure (cycle, aggregate, message).
    Error(Error),
    /// A per-input settlement report, as produced by `all_settled`.
    Outcome(Rc<Outcome>),
    /// One of this crate's own cells; adopted, never stored as-is.
    Cell(Promise),
    /// An externally-implemented thenable; adopted, never stored as-is.
    Foreign(Rc<dyn Thenable>),
}

impl Value {
    /// Creates a [`Value::Text`] from anything string-like.
    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a [`Value::List`] from a vector of values.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Rc::new(items))
    }

    /// Wraps a thenable implementation as a [`Value::Foreign`].
    pub fn foreign(thenable: impl Thenable + 'static) -> Self {
        Self::Foreign(Rc::new(thenable))
    }

    /// Returns `true` for [`Value::Unit`].
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// The boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The float payload, if any.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The error payload, if any.
    #[must_use]
    pub const fn as_error(&self) -> Option<&Error> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// The settlement report payload, if any.
    #[must_use]
    pub fn as_outcome(&self) -> Option<&Outcome> {
        match self {
            Self::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// The cell payload, if any.
    #[must_use]
    pub const fn as_cell(&self) -> Option<&Promise> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Outcome(a), Self::Outcome(b)) => a == b,
            (Self::Cell(a), Self::Cell(b)) => a.ptr_eq(b),
            (Self::Foreign(a), Self::Foreign(b)) => {
                std::ptr::eq(Rc::as_ptr(a).cast::<u8>(), Rc::as_ptr(b).cast::<u8>())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Self::Outcome(outcome) => f.debug_tuple("Outcome").field(outcome).finish(),
            Self::Cell(cell) => f.debug_tuple("Cell").field(cell).finish(),
            Self::Foreign(_) => f.write_str("Foreign(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(text) => f.write_str(text),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Error(error) => write!(f, "{error}"),
            Self::Outcome(outcome) => write!(f, "{outcome}"),
            Self::Cell(cell) => write!(f, "{cell}"),
            Self::Foreign(_) => f.write_str("<thenable>"),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(Rc::from(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(Rc::from(text))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Rc::new(items))
    }
}

impl From<Error> for Value {
    fn from(error: Error) -> Self {
        Self::Error(error)
    }
}

impl From<Outcome> for Value {
    fn from(outcome: Outcome) -> Self {
        Self::Outcome(Rc::new(outcome))
    }
}

impl From<Promise> for Value {
    fn from(cell: Promise) -> Self {
        Self::Cell(cell)
    }
}
