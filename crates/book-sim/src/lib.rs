//! Scripted Limit Book
//!
//! An in-memory [`LimitBook`](mmkit_ports::LimitBook) with no matching.
//! It accepts or rejects insertions according to a [`BookPolicy`], keeps
//! every resting order with its notification callback, and lets a driver
//! deliver fill, cancel and stop events by hand.
//!
//! Callbacks are always invoked after the book's internal lock has been
//! released, so agents may insert new orders from inside their reactions.

mod book;
mod error;

pub use book::{BookPolicy, RestingOrder, ScriptedBook};
pub use error::{BookError, Result};
