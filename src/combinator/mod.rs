//! Combinators aggregating many cells into one derived cell.
//!
//! This module provides the four aggregation operations, attached to
//! [`Promise`] as associated functions:
//!
//! - [`Promise::all`]: wait for every input, fail fast on the first rejection
//! - [`Promise::all_settled`]: wait for every input, never fail
//! - [`Promise::race`]: first settlement wins, whichever way it went
//! - [`Promise::any`]: first fulfillment wins, aggregate error if none
//!
//! All of them accept any finite iterable of [`Value`]s; inputs that are not
//! already cells are normalized through [`Promise::resolve`]. Results that
//! carry one slot per input (`all`, `all_settled`, `any`'s aggregate) are
//! assigned by original input index — completion order is irrelevant to the
//! shape of the result.
//!
//! Each combinator is built entirely on the public chaining contract plus the
//! derived cell's at-most-once settlement; there is no private coordination
//! channel between a combinator and its inputs.
//!
//! [`Promise`]: crate::promise::Promise
//! [`Promise::all`]: crate::promise::Promise::all
//! [`Promise::all_settled`]: crate::promise::Promise::all_settled
//! [`Promise::race`]: crate::promise::Promise::race
//! [`Promise::any`]: crate::promise::Promise::any
//! [`Promise::resolve`]: crate::promise::Promise::resolve
//! [`Value`]: crate::value::Value

mod all;
mod all_settled;
mod any;
mod race;

use crate::promise::Promise;
use crate::value::Value;

/// Normalizes combinator inputs: every value becomes a cell, in input order.
fn normalized<I>(inputs: I) -> Vec<Promise>
where
    I: IntoIterator<Item = Value>,
{
    inputs.into_iter().map(Promise::resolve).collect()
}
