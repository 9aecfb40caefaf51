use serde::{Deserialize, Serialize};

use super::{OrderId, Side};
use crate::values::{Price, Quantity};

/// Snapshot of the most recent fill an agent received
///
/// The side comes from the agent's own order record; price and size are
/// what the book reported for the execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFill {
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
    pub id: OrderId,
}

impl LastFill {
    pub fn was_buy(&self) -> bool {
        self.side.is_buy()
    }
}
