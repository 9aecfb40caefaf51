//! mmkit Ports
//!
//! Port definitions for the market-maker framework.
//! These define the boundary between agents and the external order book.

mod book;
mod error;

pub use book::{BookEvent, LimitBook, OrderCallback};
pub use error::{AgentError, AgentResult};
