//! Strategy Trait and Agent Runtime
//!
//! A [`Strategy`] decides what to quote; an [`Agent`] pairs it with the
//! [`AgentCore`] bookkeeping and guarantees that base reconciliation runs
//! before every strategy hook. [`AgentHandle`] is the owner-facing, uniquely
//! owned wrapper whose mutex serialises owner calls and book callbacks.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::{debug, warn};
use mmkit_core::{LastFill, OrderId, OrderRecord, Price, Quantity, Side};
use mmkit_ports::{AgentResult, BookEvent, LimitBook, OrderCallback};
use parking_lot::{Mutex, MutexGuard};

use crate::agent::{AgentCore, AgentId};

/// Strategy trait - implement this for a quoting policy
///
/// Every hook runs after [`AgentCore`] has already applied the event, so
/// `agent.last_fill()` and `agent.orders()` reflect it.
pub trait Strategy: Send + 'static {
    /// Strategy name for logging and agent ids
    fn name(&self) -> &'static str;

    /// Called once the agent is bound and running
    fn on_start(&mut self, _agent: &mut AgentCore, _implied: Price) -> AgentResult<()> {
        Ok(())
    }

    /// Called after a fill has been reconciled
    fn on_fill(&mut self, _agent: &mut AgentCore, _fill: &LastFill) -> AgentResult<()> {
        Ok(())
    }

    /// Called after a cancel has been reconciled
    fn on_cancel(&mut self, _agent: &mut AgentCore, _id: OrderId) -> AgentResult<()> {
        Ok(())
    }

    /// Called after a stop has been reconciled (the agent is no longer running)
    fn on_stop(&mut self, _agent: &mut AgentCore, _id: OrderId) -> AgentResult<()> {
        Ok(())
    }
}

/// Object-safe view of an agent, used for heterogeneous collections
pub trait MarketMaker: Send {
    fn core(&self) -> &AgentCore;

    fn core_mut(&mut self) -> &mut AgentCore;

    fn strategy_name(&self) -> &'static str;

    fn start(&mut self, book: Weak<dyn LimitBook>, implied: Price, tick: Price)
    -> AgentResult<()>;

    fn stop(&mut self);

    /// Reconcile `event` then run the strategy's reaction
    fn handle_event(&mut self, event: BookEvent) -> AgentResult<()>;
}

/// Base bookkeeping plus a strategy
pub struct Agent<S: Strategy> {
    core: AgentCore,
    strategy: S,
}

impl<S: Strategy> Agent<S> {
    pub fn new(strategy: S, notify: OrderCallback) -> Self {
        Self {
            core: AgentCore::new(AgentId::next(strategy.name()), notify),
            strategy,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<S: Strategy> MarketMaker for Agent<S> {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    fn start(
        &mut self,
        book: Weak<dyn LimitBook>,
        implied: Price,
        tick: Price,
    ) -> AgentResult<()> {
        self.core.start(book, implied, tick)?;
        self.strategy.on_start(&mut self.core, implied)
    }

    fn stop(&mut self) {
        self.core.stop();
    }

    fn handle_event(&mut self, event: BookEvent) -> AgentResult<()> {
        debug!("[{}] Event {} for {}", self.core.id(), event.kind(), event.order_id());
        let fill = self.core.reconcile(&event)?;

        match (event, fill) {
            (BookEvent::Fill { .. }, Some(fill)) => self.strategy.on_fill(&mut self.core, &fill),
            (BookEvent::Fill { .. }, None) => Ok(()),
            (BookEvent::Cancel { id }, _) => self.strategy.on_cancel(&mut self.core, id),
            (BookEvent::Stop { id }, _) => self.strategy.on_stop(&mut self.core, id),
        }
    }
}

/// Deliver a book event to the agent behind `agent`, if it still exists
fn dispatch<S: Strategy>(agent: &Weak<Mutex<Agent<S>>>, event: BookEvent) -> AgentResult<()> {
    match agent.upgrade() {
        Some(agent) => agent.lock().handle_event(event),
        None => {
            warn!(
                "Dropping {} for {}: agent no longer exists",
                event.kind(),
                event.order_id()
            );
            Ok(())
        }
    }
}

/// Uniquely owned handle to one agent
///
/// Not `Clone`: collections of handles move, never duplicate. The book only
/// ever holds a weak reference through the order callback.
pub struct AgentHandle {
    inner: Arc<Mutex<dyn MarketMaker>>,
}

impl AgentHandle {
    pub fn new<S: Strategy>(strategy: S) -> Self {
        let inner: Arc<Mutex<Agent<S>>> = Arc::new_cyclic(|weak: &Weak<Mutex<Agent<S>>>| {
            let weak = weak.clone();
            let notify: OrderCallback = Arc::new(move |event| dispatch(&weak, event));
            Mutex::new(Agent::new(strategy, notify))
        });
        Self { inner }
    }

    /// Lock the agent for direct inspection or control.
    ///
    /// Do not hold the guard while driving book callbacks for this agent.
    pub fn lock(&self) -> MutexGuard<'_, dyn MarketMaker> {
        self.inner.lock()
    }

    pub fn start(
        &self,
        book: Weak<dyn LimitBook>,
        implied: Price,
        tick: Price,
    ) -> AgentResult<()> {
        self.inner.lock().start(book, implied, tick)
    }

    pub fn stop(&self) {
        self.inner.lock().stop();
    }

    pub fn insert(&self, side: Side, price: Price, size: Quantity) -> AgentResult<OrderId> {
        self.inner.lock().core_mut().insert(side, price, size)
    }

    pub fn id(&self) -> AgentId {
        self.inner.lock().core().id().clone()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.inner.lock().strategy_name()
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().core().is_running()
    }

    /// Copy of the tracked order table
    pub fn orders(&self) -> HashMap<OrderId, OrderRecord> {
        self.inner.lock().core().orders().clone()
    }

    pub fn last_fill(&self) -> Option<LastFill> {
        self.inner.lock().core().last_fill().copied()
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(agent) => f
                .debug_struct("AgentHandle")
                .field("strategy", &agent.strategy_name())
                .field("core", agent.core())
                .finish(),
            None => f.debug_struct("AgentHandle").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmkit_book_sim::ScriptedBook;
    use mmkit_ports::AgentError;
    use rust_decimal_macros::dec;

    /// Records which hooks ran and what the core looked like at the time
    #[derive(Default)]
    struct Probe {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Strategy for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn on_start(&mut self, agent: &mut AgentCore, implied: Price) -> AgentResult<()> {
            self.seen.lock().push(format!("start {implied}"));
            agent.insert_buy(implied - dec!(1), 4)?;
            Ok(())
        }

        fn on_fill(&mut self, agent: &mut AgentCore, fill: &LastFill) -> AgentResult<()> {
            self.seen
                .lock()
                .push(format!("fill {} tracked={}", fill.size, agent.orders().len()));
            Ok(())
        }

        fn on_cancel(&mut self, _agent: &mut AgentCore, id: OrderId) -> AgentResult<()> {
            self.seen.lock().push(format!("cancel {}", id.get()));
            Ok(())
        }

        fn on_stop(&mut self, agent: &mut AgentCore, _id: OrderId) -> AgentResult<()> {
            self.seen
                .lock()
                .push(format!("stop running={}", agent.is_running()));
            Ok(())
        }
    }

    fn book_handle(book: &Arc<ScriptedBook>) -> Weak<dyn LimitBook> {
        Arc::downgrade(book) as Weak<dyn LimitBook>
    }

    #[test]
    fn test_base_runs_before_strategy() {
        let book = ScriptedBook::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentHandle::new(Probe {
            seen: Arc::clone(&seen),
        });

        agent.start(book_handle(&book), dec!(100), dec!(1)).unwrap();
        let id = *agent.orders().keys().next().unwrap();

        book.fill(id, dec!(99), 4).unwrap();
        agent.insert(Side::Sell, dec!(101), 2).unwrap();
        let sell = agent
            .orders()
            .into_iter()
            .find(|(_, r)| r.side == Side::Sell)
            .map(|(id, _)| id)
            .unwrap();
        book.cancel(sell).unwrap();
        agent.lock().handle_event(BookEvent::Stop { id }).unwrap();

        let seen = seen.lock().clone();
        assert_eq!(
            seen,
            vec![
                "start 100".to_string(),
                "fill 4 tracked=0".to_string(),
                format!("cancel {}", sell.get()),
                "stop running=false".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_fill_skips_strategy() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let agent = AgentHandle::new(Probe {
            seen: Arc::clone(&seen),
        });
        let id = OrderId::new(3).unwrap();

        let err = agent
            .lock()
            .handle_event(BookEvent::Fill {
                id,
                price: dec!(1),
                size: 1,
            })
            .unwrap_err();

        assert_eq!(err, AgentError::UnknownOrder(id));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_book_callback_reaches_agent() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(Probe::default());
        agent.start(book_handle(&book), dec!(100), dec!(1)).unwrap();
        let id = *agent.orders().keys().next().unwrap();

        book.fill(id, dec!(99), 4).unwrap();

        assert!(agent.orders().is_empty());
        assert_eq!(agent.last_fill().map(|f| f.price), Some(dec!(99)));
    }

    #[test]
    fn test_callback_after_agent_dropped_is_ignored() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(Probe::default());
        agent.start(book_handle(&book), dec!(100), dec!(1)).unwrap();
        let id = *agent.orders().keys().next().unwrap();
        drop(agent);

        assert!(book.fill(id, dec!(99), 4).is_ok());
    }

    #[test]
    fn test_handle_stop_and_restart() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(Probe::default());
        agent.start(book_handle(&book), dec!(100), dec!(1)).unwrap();

        agent.stop();
        assert!(!agent.is_running());
        assert!(matches!(
            agent.insert(Side::Buy, dec!(90), 1),
            Err(AgentError::InvalidState(_))
        ));

        // Restart re-runs start-up quoting; the stale record is kept
        agent.start(book_handle(&book), dec!(100), dec!(1)).unwrap();
        assert_eq!(agent.orders().len(), 2);
        assert_eq!(agent.strategy_name(), "probe");
        assert!(agent.id().as_str().starts_with("probe-"));
    }
}
