//! Simple-Grid Market Maker
//!
//! Lays a fixed ladder of five asks and five bids around the implied price.
//!
//! The fill re-quote (one order on each side of the fill, at one and two
//! ticks) places two orders per fill and can pile up inventory, so it is
//! off unless `requote_on_fill` is set.

use log::debug;
use mmkit_core::{LastFill, Price, Quantity};
use mmkit_ports::AgentResult;
use rust_decimal::Decimal;

use crate::agent::{AgentCore, price_above, price_below};
use crate::strategy::Strategy;

/// Levels quoted per side at start-up
pub const GRID_LEVELS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleGrid {
    size: Quantity,
    requote_on_fill: bool,
}

impl SimpleGrid {
    pub fn new(size: Quantity) -> Self {
        Self {
            size,
            requote_on_fill: false,
        }
    }

    /// Enable the two-order re-quote after each fill
    pub fn with_requote(mut self, enabled: bool) -> Self {
        self.requote_on_fill = enabled;
        self
    }

    pub fn size(&self) -> Quantity {
        self.size
    }

    pub fn requotes_on_fill(&self) -> bool {
        self.requote_on_fill
    }
}

impl Strategy for SimpleGrid {
    fn name(&self) -> &'static str {
        "simple-grid"
    }

    fn on_start(&mut self, agent: &mut AgentCore, implied: Price) -> AgentResult<()> {
        let tick = agent.tick();

        let mut price = price_above(implied, Decimal::ONE)?;
        for level in 0..GRID_LEVELS {
            if level > 0 {
                price = price_above(price, tick)?;
            }
            agent.insert_sell(price, self.size)?;
        }

        let mut price = price_below(implied, Decimal::ONE)?;
        for level in 0..GRID_LEVELS {
            if level > 0 {
                price = price_below(price, tick)?;
            }
            agent.insert_buy(price, self.size)?;
        }
        Ok(())
    }

    /// Re-quote around the fill. A fill delivered after `stop` still tries
    /// to insert, so the book sees the `InvalidState` error.
    fn on_fill(&mut self, agent: &mut AgentCore, fill: &LastFill) -> AgentResult<()> {
        if !self.requote_on_fill {
            return Ok(());
        }

        let tick = agent.ticks(1)?;
        let two_ticks = agent.ticks(2)?;
        debug!("[{}] Re-quoting around {} fill @ {}", agent.id(), fill.side, fill.price);
        if fill.was_buy() {
            agent.insert_buy(price_below(fill.price, tick)?, fill.size)?;
            agent.insert_sell(price_above(fill.price, two_ticks)?, fill.size)?;
        } else {
            agent.insert_sell(price_above(fill.price, tick)?, fill.size)?;
            agent.insert_buy(price_below(fill.price, two_ticks)?, fill.size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::AgentHandle;
    use mmkit_book_sim::{BookError, ScriptedBook};
    use mmkit_core::{OrderRecord, Side};
    use mmkit_ports::{AgentError, LimitBook};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Weak};

    fn prices(agent: &AgentHandle, side: Side) -> Vec<Price> {
        let mut prices: Vec<Price> = agent
            .orders()
            .values()
            .filter(|r| r.side == side)
            .map(|r| r.price)
            .collect();
        prices.sort();
        prices
    }

    #[test]
    fn test_start_lays_ten_level_grid() {
        let _ = env_logger::try_init();
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(10));

        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();

        let orders = agent.orders();
        assert_eq!(orders.len(), 10);
        assert!(orders.values().all(|r| r.size == 10));
        assert_eq!(
            prices(&agent, Side::Sell),
            vec![dec!(101), dec!(102), dec!(103), dec!(104), dec!(105)]
        );
        assert_eq!(
            prices(&agent, Side::Buy),
            vec![dec!(95), dec!(96), dec!(97), dec!(98), dec!(99)]
        );
        assert_eq!(book.len(), 10);
    }

    #[test]
    fn test_grid_uses_tick_spacing() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(1));

        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(50), dec!(0.25))
            .unwrap();

        assert_eq!(
            prices(&agent, Side::Sell),
            vec![dec!(51), dec!(51.25), dec!(51.5), dec!(51.75), dec!(52)]
        );
        assert_eq!(
            prices(&agent, Side::Buy),
            vec![dec!(48), dec!(48.25), dec!(48.5), dec!(48.75), dec!(49)]
        );
    }

    #[test]
    fn test_fill_places_nothing_by_default() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(10));
        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();
        let id = agent
            .orders()
            .into_iter()
            .find(|(_, r)| r.price == dec!(101))
            .map(|(id, _)| id)
            .unwrap();

        book.fill(id, dec!(101), 10).unwrap();

        assert_eq!(agent.orders().len(), 9);
        assert_eq!(book.len(), 9);
        let fill = agent.last_fill().unwrap();
        assert_eq!(fill.side, Side::Sell);
        assert_eq!(fill.price, dec!(101));
        assert_eq!(fill.size, 10);
    }

    #[test]
    fn test_requote_after_buy_fill() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(10).with_requote(true));
        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();
        let id = agent
            .orders()
            .into_iter()
            .find(|(_, r)| r.price == dec!(99))
            .map(|(id, _)| id)
            .unwrap();

        book.fill(id, dec!(99), 10).unwrap();

        let orders = agent.orders();
        assert_eq!(orders.len(), 11);
        assert!(orders.values().any(|r| *r == OrderRecord::new(Side::Buy, dec!(98), 10)));
        assert!(orders.values().any(|r| *r == OrderRecord::new(Side::Sell, dec!(101), 10)));
    }

    #[test]
    fn test_requote_after_sell_fill() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(4).with_requote(true));
        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();
        let id = agent
            .orders()
            .into_iter()
            .find(|(_, r)| r.price == dec!(102))
            .map(|(id, _)| id)
            .unwrap();

        book.fill(id, dec!(102), 3).unwrap();

        let orders = agent.orders();
        // Partial fill keeps the original record and adds two more
        assert_eq!(orders.len(), 12);
        assert!(orders.values().any(|r| *r == OrderRecord::new(Side::Sell, dec!(103), 3)));
        assert!(orders.values().any(|r| *r == OrderRecord::new(Side::Buy, dec!(100), 3)));
    }

    #[test]
    fn test_requote_after_stop_reports_invalid_state() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(10).with_requote(true));
        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();
        let id = *agent.orders().keys().next().unwrap();
        agent.stop();

        let result = book.fill_at_limit(id, 10);

        assert!(matches!(
            result,
            Err(BookError::Callback(AgentError::InvalidState(_)))
        ));
        assert_eq!(agent.orders().len(), 9);
        assert_eq!(agent.last_fill().map(|f| f.id), Some(id));
    }

    #[test]
    fn test_fill_after_stop_is_quiet_without_requote() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(10));
        agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))
            .unwrap();
        let id = *agent.orders().keys().next().unwrap();
        agent.stop();

        book.fill_at_limit(id, 10).unwrap();

        assert_eq!(agent.orders().len(), 9);
    }

    #[test]
    fn test_start_at_decimal_limit_is_invalid_argument() {
        let book = ScriptedBook::new();
        let agent = AgentHandle::new(SimpleGrid::new(1));

        let err = agent
            .start(Arc::downgrade(&book) as Weak<dyn LimitBook>, Decimal::MAX, dec!(1))
            .unwrap_err();

        assert!(matches!(err, AgentError::InvalidArgument(_)));
        assert!(agent.orders().is_empty());
        assert!(book.is_empty());
    }
}
