//! mmkit Market-Maker Agents
//!
//! Autonomous agents that rest limit orders in an external book, fold the
//! book's fill/cancel/stop callbacks back into their own order table, and
//! re-quote according to a pluggable [`Strategy`].
//!
//! ## Architecture
//!
//! ```text
//!   Owner ──start/stop/insert──►  AgentHandle (Mutex)
//!                                    │
//!                          ┌─────────┴─────────┐
//!                          │ AgentCore         │ reconcile first
//!                          │ Strategy hooks    │ then react
//!                          └─────────┬─────────┘
//!                                    │ insert_limit_order
//!                                    ▼
//!                              LimitBook  ──BookEvent──► OrderCallback (Weak)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mmkit_strategy::factory;
//!
//! let agents = factory::simple_grid_n(3, 10);
//! for agent in &agents {
//!     agent.start(Arc::downgrade(&book) as Weak<dyn LimitBook>, dec!(100), dec!(1))?;
//! }
//! ```

pub mod agent;
pub mod config;
pub mod factory;
pub mod passive;
pub mod randomized;
pub mod simple_grid;
pub mod strategy;

// Re-export main types
pub use agent::{AgentCore, AgentId};
pub use config::{ConfigError, FleetConfig, FleetEntry};
pub use factory::{Agents, merge};
pub use passive::{ExternalCallback, Passive};
pub use randomized::{QuoteDraws, Randomized, UniformDraws};
pub use simple_grid::SimpleGrid;
pub use strategy::{Agent, AgentHandle, MarketMaker, Strategy};
