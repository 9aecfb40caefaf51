use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use mmkit_core::{OrderId, Price, Quantity, Side};
use mmkit_ports::{BookEvent, LimitBook, OrderCallback};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::{BookError, Result};

/// Acceptance rules for new orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPolicy {
    /// Lowest acceptable limit price (inclusive)
    pub min_price: Price,
    /// Largest acceptable order size (inclusive)
    pub max_size: Quantity,
}

impl Default for BookPolicy {
    fn default() -> Self {
        Self {
            min_price: Decimal::new(1, 2), // $0.01
            max_size: Quantity::MAX,
        }
    }
}

impl BookPolicy {
    /// Zero-size orders are never accepted
    pub fn accepts(&self, price: Price, size: Quantity) -> bool {
        size > 0 && size <= self.max_size && price >= self.min_price
    }
}

/// An order resting in the scripted book
#[derive(Clone)]
pub struct RestingOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Size as inserted
    pub size: Quantity,
    /// Size not yet filled
    pub remaining: Quantity,
    notify: OrderCallback,
}

impl std::fmt::Debug for RestingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestingOrder")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("price", &self.price)
            .field("size", &self.size)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct BookState {
    resting: BTreeMap<OrderId, RestingOrder>,
    last_id: u64,
    rejected: u64,
    forced_rejections: u64,
}

/// In-memory book driven by hand
///
/// Ids are assigned sequentially from 1. Nothing ever matches on its own:
/// the driver decides which orders fill, cancel, or stop.
pub struct ScriptedBook {
    policy: BookPolicy,
    state: Mutex<BookState>,
}

impl ScriptedBook {
    pub fn new() -> Arc<Self> {
        Self::with_policy(BookPolicy::default())
    }

    pub fn with_policy(policy: BookPolicy) -> Arc<Self> {
        Arc::new(Self {
            policy,
            state: Mutex::new(BookState::default()),
        })
    }

    pub fn policy(&self) -> &BookPolicy {
        &self.policy
    }

    /// Reject the next `n` insertions regardless of policy
    pub fn reject_next(&self, n: u64) {
        self.state.lock().forced_rejections = n;
    }

    /// Number of insertions rejected so far
    pub fn rejected_count(&self) -> u64 {
        self.state.lock().rejected
    }

    pub fn len(&self) -> usize {
        self.state.lock().resting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn order(&self, id: OrderId) -> Option<RestingOrder> {
        self.state.lock().resting.get(&id).cloned()
    }

    /// All resting orders in id (arrival) order
    pub fn resting(&self) -> Vec<RestingOrder> {
        self.state.lock().resting.values().cloned().collect()
    }

    /// Resting (price, remaining) pairs for one side, best price first
    pub fn levels(&self, side: Side) -> Vec<(Price, Quantity)> {
        let mut levels: Vec<(Price, Quantity)> = self
            .state
            .lock()
            .resting
            .values()
            .filter(|o| o.side == side)
            .map(|o| (o.price, o.remaining))
            .collect();

        match side {
            Side::Buy => levels.sort_by(|a, b| b.0.cmp(&a.0)),
            Side::Sell => levels.sort_by(|a, b| a.0.cmp(&b.0)),
        }
        levels
    }

    /// Report an execution of `size` lots at `price` against a resting order.
    ///
    /// The book tracks the remainder itself and drops the order once it is
    /// exhausted; the agent's own bookkeeping is independent of that.
    pub fn fill(&self, id: OrderId, price: Price, size: Quantity) -> Result<()> {
        if size == 0 {
            return Err(BookError::EmptyFill);
        }

        let notify = {
            let mut state = self.state.lock();
            let order = state
                .resting
                .get_mut(&id)
                .ok_or(BookError::OrderNotFound(id))?;
            order.remaining = order.remaining.saturating_sub(size);
            let notify = Arc::clone(&order.notify);
            if order.remaining == 0 {
                state.resting.remove(&id);
            }
            notify
        };

        debug!("Book fill {} {} @ {}", id, size, price);
        notify(BookEvent::Fill { id, price, size })?;
        Ok(())
    }

    /// Fill at the order's own limit price
    pub fn fill_at_limit(&self, id: OrderId, size: Quantity) -> Result<()> {
        let price = self
            .state
            .lock()
            .resting
            .get(&id)
            .map(|o| o.price)
            .ok_or(BookError::OrderNotFound(id))?;
        self.fill(id, price, size)
    }

    /// Remove a resting order and notify its owner
    pub fn cancel(&self, id: OrderId) -> Result<()> {
        let order = self
            .state
            .lock()
            .resting
            .remove(&id)
            .ok_or(BookError::OrderNotFound(id))?;

        debug!("Book cancel {}", id);
        (order.notify)(BookEvent::Cancel { id })?;
        Ok(())
    }

    /// Send a stop notification to every distinct callback with resting orders.
    ///
    /// Resting orders stay in the book. Every callback is notified even if an
    /// earlier one fails; the first failure is returned.
    pub fn stop(&self) -> Result<usize> {
        let targets: Vec<(OrderId, OrderCallback)> = {
            let state = self.state.lock();
            let mut seen = HashSet::new();
            state
                .resting
                .values()
                .filter(|o| seen.insert(Arc::as_ptr(&o.notify) as *const () as usize))
                .map(|o| (o.id, Arc::clone(&o.notify)))
                .collect()
        };

        info!("Book stopping, notifying {} agents", targets.len());
        let mut first_error = None;
        for (id, notify) in &targets {
            if let Err(err) = notify(BookEvent::Stop { id: *id }) {
                warn!("Stop notification for {} failed: {}", id, err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(targets.len()),
        }
    }
}

impl LimitBook for ScriptedBook {
    fn insert_limit_order(
        &self,
        side: Side,
        price: Price,
        size: Quantity,
        notify: OrderCallback,
    ) -> Option<OrderId> {
        let mut state = self.state.lock();

        if state.forced_rejections > 0 {
            state.forced_rejections -= 1;
            state.rejected += 1;
            warn!("Book rejecting {} {} @ {} (forced)", side, size, price);
            return None;
        }
        if !self.policy.accepts(price, size) {
            state.rejected += 1;
            warn!("Book rejecting {} {} @ {}", side, size, price);
            return None;
        }

        state.last_id += 1;
        let id = OrderId::new(state.last_id)?;
        state.resting.insert(
            id,
            RestingOrder {
                id,
                side,
                price,
                size,
                remaining: size,
                notify,
            },
        );
        debug!("Book accepted {} {} {} @ {}", id, side, size, price);
        Some(id)
    }
}
