use std::sync::Arc;

use mmkit_core::{OrderId, Price, Quantity, Side};

use crate::error::AgentResult;

/// Notification a book delivers for one of an agent's orders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookEvent {
    /// Order traded `size` lots at `price`
    Fill {
        id: OrderId,
        price: Price,
        size: Quantity,
    },
    /// Order was removed from the book without trading
    Cancel { id: OrderId },
    /// Book is shutting down; the agent should stop quoting
    Stop { id: OrderId },
}

impl BookEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            BookEvent::Fill { id, .. } | BookEvent::Cancel { id } | BookEvent::Stop { id } => *id,
        }
    }

    /// Short name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            BookEvent::Fill { .. } => "fill",
            BookEvent::Cancel { .. } => "cancel",
            BookEvent::Stop { .. } => "stop",
        }
    }
}

/// Callback bound to an order at insertion time
///
/// Errors are returned to whoever dispatched the event.
pub type OrderCallback = Arc<dyn Fn(BookEvent) -> AgentResult<()> + Send + Sync>;

/// Port for the external limit order book
///
/// Implementations must deliver callbacks asynchronously with respect to
/// `insert_limit_order`: never invoke `notify` before returning the id, and
/// never hold internal locks while invoking a callback, because an agent may
/// insert new orders from inside its reaction.
pub trait LimitBook: Send + Sync {
    /// Insert a resting limit order.
    ///
    /// Returns `None` when the book rejects the order (bad price/size per
    /// book policy).
    fn insert_limit_order(
        &self,
        side: Side,
        price: Price,
        size: Quantity,
        notify: OrderCallback,
    ) -> Option<OrderId>;
}
