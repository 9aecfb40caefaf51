use mmkit_core::OrderId;
use mmkit_ports::AgentError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Order not resting: {0}")]
    OrderNotFound(OrderId),

    #[error("Fill size must be positive")]
    EmptyFill,

    #[error("Agent callback failed: {0}")]
    Callback(#[from] AgentError),
}

pub type Result<T> = std::result::Result<T, BookError>;
