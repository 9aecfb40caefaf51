//! Agent Base
//!
//! Lifecycle state and order bookkeeping shared by every market maker.
//! Strategies never own this state; they receive `&mut AgentCore` in their
//! hooks and quote through [`AgentCore::insert`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, info, warn};
use mmkit_core::{LastFill, OrderId, OrderRecord, Price, Quantity, Side};
use mmkit_ports::{AgentError, AgentResult, BookEvent, LimitBook, OrderCallback};
use rust_decimal::Decimal;

static NEXT_AGENT: AtomicU64 = AtomicU64::new(1);

/// Display identifier for an agent, used in log lines
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentId(String);

impl AgentId {
    /// Allocate the next process-wide id, e.g. `simple-grid-3`
    pub fn next(kind: &str) -> Self {
        let n = NEXT_AGENT.fetch_add(1, Ordering::Relaxed);
        Self(format!("{kind}-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `base + delta`, rejecting results outside the decimal range
pub fn price_above(base: Price, delta: Price) -> AgentResult<Price> {
    base.checked_add(delta).ok_or_else(|| {
        AgentError::InvalidArgument(format!("price {base} + {delta} overflows"))
    })
}

/// `base - delta`, rejecting results outside the decimal range
pub fn price_below(base: Price, delta: Price) -> AgentResult<Price> {
    base.checked_sub(delta).ok_or_else(|| {
        AgentError::InvalidArgument(format!("price {base} - {delta} overflows"))
    })
}

/// Running state, book binding and order table of one agent
pub struct AgentCore {
    id: AgentId,
    running: bool,
    book: Option<Weak<dyn LimitBook>>,
    tick: Price,
    /// Client-side cache of outstanding orders; the book is authoritative
    orders: HashMap<OrderId, OrderRecord>,
    last_fill: Option<LastFill>,
    notify: OrderCallback,
}

impl AgentCore {
    /// Create an inert agent: not running, no book, zero tick.
    ///
    /// `notify` is handed to the book with every order this agent inserts.
    pub fn new(id: AgentId, notify: OrderCallback) -> Self {
        Self {
            id,
            running: false,
            book: None,
            tick: Decimal::ZERO,
            orders: HashMap::new(),
            last_fill: None,
            notify,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a book handle is currently bound (it may since have been dropped)
    pub fn has_book(&self) -> bool {
        self.book.is_some()
    }

    pub fn tick(&self) -> Price {
        self.tick
    }

    /// `n` ticks as a price offset
    pub fn ticks(&self, n: u32) -> AgentResult<Price> {
        self.tick.checked_mul(Decimal::from(n)).ok_or_else(|| {
            AgentError::InvalidArgument(format!("{n} ticks of {} overflows", self.tick))
        })
    }

    /// Outstanding orders as tracked from book callbacks
    pub fn orders(&self) -> &HashMap<OrderId, OrderRecord> {
        &self.orders
    }

    pub fn order(&self, id: OrderId) -> Option<&OrderRecord> {
        self.orders.get(&id)
    }

    /// Most recent fill, `None` until the first fill arrives
    pub fn last_fill(&self) -> Option<&LastFill> {
        self.last_fill.as_ref()
    }

    /// Bind to `book` and begin accepting inserts.
    ///
    /// Calling this while already running just rebinds book and tick.
    pub fn start(
        &mut self,
        book: Weak<dyn LimitBook>,
        implied: Price,
        tick: Price,
    ) -> AgentResult<()> {
        if book.strong_count() == 0 {
            return Err(AgentError::InvalidArgument(
                "book handle is empty".to_string(),
            ));
        }

        self.book = Some(book);
        self.tick = tick;
        self.running = true;
        info!(
            "[{}] Started: implied={} tick={} tracked_orders={}",
            self.id,
            implied,
            tick,
            self.orders.len()
        );
        Ok(())
    }

    /// Stop quoting and release the book handle. Tracked orders are kept.
    pub fn stop(&mut self) {
        if self.running {
            info!(
                "[{}] Stopped with {} tracked orders",
                self.id,
                self.orders.len()
            );
        }
        self.running = false;
        self.book = None;
    }

    /// Submit a limit order to the bound book and track it.
    pub fn insert(&mut self, side: Side, price: Price, size: Quantity) -> AgentResult<OrderId> {
        if !self.running {
            return Err(AgentError::InvalidState(format!(
                "{} is not running",
                self.id
            )));
        }
        let book = self
            .book
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| {
                AgentError::InvalidState(format!("{}: bound book no longer exists", self.id))
            })?;

        let Some(id) = book.insert_limit_order(side, price, size, Arc::clone(&self.notify)) else {
            warn!("[{}] Book rejected {} {} @ {}", self.id, side, size, price);
            return Err(AgentError::InvalidOrder { side, price, size });
        };

        self.orders.insert(id, OrderRecord::new(side, price, size));
        debug!("[{}] Inserted {} {} {} @ {}", self.id, id, side, size, price);
        Ok(id)
    }

    pub fn insert_buy(&mut self, price: Price, size: Quantity) -> AgentResult<OrderId> {
        self.insert(Side::Buy, price, size)
    }

    pub fn insert_sell(&mut self, price: Price, size: Quantity) -> AgentResult<OrderId> {
        self.insert(Side::Sell, price, size)
    }

    /// Fold one book event into the order table.
    ///
    /// Returns the new last-fill snapshot for fill events, `None` otherwise.
    /// A fill removes the order only when that single fill is at least the
    /// order's original size.
    pub fn reconcile(&mut self, event: &BookEvent) -> AgentResult<Option<LastFill>> {
        match *event {
            BookEvent::Fill { id, price, size } => {
                let Some(record) = self.orders.get(&id).copied() else {
                    warn!("[{}] Fill for unknown order {}", self.id, id);
                    return Err(AgentError::UnknownOrder(id));
                };

                let fill = LastFill {
                    side: record.side,
                    price,
                    size,
                    id,
                };
                self.last_fill = Some(fill);

                if record.is_consumed_by(size) {
                    self.orders.remove(&id);
                    debug!("[{}] {} filled {} @ {}, done", self.id, id, size, price);
                } else {
                    debug!(
                        "[{}] {} partially filled {}/{} @ {}",
                        self.id, id, size, record.size, price
                    );
                }
                Ok(Some(fill))
            }
            BookEvent::Cancel { id } => {
                if self.orders.remove(&id).is_some() {
                    debug!("[{}] {} cancelled", self.id, id);
                } else {
                    debug!("[{}] Ignoring cancel for untracked {}", self.id, id);
                }
                Ok(None)
            }
            BookEvent::Stop { id } => {
                debug!("[{}] Stop received via {}", self.id, id);
                self.stop();
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCore")
            .field("id", &self.id)
            .field("running", &self.running)
            .field("has_book", &self.book.is_some())
            .field("tick", &self.tick)
            .field("orders", &self.orders)
            .field("last_fill", &self.last_fill)
            .finish()
    }
}
