use mmkit_core::{OrderId, Price, Quantity, Side};
use thiserror::Error;

/// Errors raised by agents to their immediate caller
///
/// None of these are retried internally. `start`/`insert` failures go to
/// the owner; reconciliation failures go back to the book's dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Order rejected by book: {side} {size} @ {price}")]
    InvalidOrder {
        side: Side,
        price: Price,
        size: Quantity,
    },

    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;
