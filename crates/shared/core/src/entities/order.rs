use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{Price, Quantity};

/// Book-assigned order identifier
///
/// Zero is reserved by books as the "rejected" sentinel, so a valid id is
/// always non-zero. Rejection is expressed as `None` at the port boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(NonZeroU64);

impl OrderId {
    /// Wrap a raw id; returns `None` for the zero sentinel
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One outstanding order as it was submitted
///
/// Immutable once created. Fill progress is not tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
}

impl OrderRecord {
    pub fn new(side: Side, price: Price, size: Quantity) -> Self {
        Self { side, price, size }
    }

    /// Whether a single fill of `fill_size` consumes this order.
    ///
    /// Compares against the original size only; a run of partial fills
    /// each smaller than the original never consumes the order.
    pub fn is_consumed_by(&self, fill_size: Quantity) -> bool {
        fill_size >= self.size
    }
}
