//! Randomized Market Maker
//!
//! Quotes a random number of levels at a random spacing on start-up, then
//! after every fill adds one order on the side that just traded, a random
//! number of ticks further from the market.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::debug;
use mmkit_core::{LastFill, Price, Quantity};
use mmkit_ports::AgentResult;
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rust_decimal::Decimal;

use crate::agent::{AgentCore, price_above, price_below};
use crate::strategy::Strategy;

/// Inclusive bounds of the step draw (level count and tick multiplier)
pub const MIN_STEP: u32 = 1;
pub const MAX_STEP: u32 = 5;

static SEED_EPOCH: OnceLock<Instant> = OnceLock::new();
static SEED_INSTANCES: AtomicU64 = AtomicU64::new(0);

/// Seed unique to this instance: a monotonic clock delta since the first
/// seed was taken, mixed with a process-wide instance counter, reduced into
/// `[1, i64::MAX)`.
pub fn instance_seed() -> u64 {
    let epoch = SEED_EPOCH.get_or_init(Instant::now);
    let elapsed = epoch.elapsed().as_nanos() as u64;
    let instance = SEED_INSTANCES.fetch_add(1, Ordering::Relaxed) + 1;

    let mut z = elapsed ^ instance.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    z % (i64::MAX as u64 - 1) + 1
}

/// Source of the random quantities the strategy needs
pub trait QuoteDraws: Send + 'static {
    /// Order size within the configured range
    fn size(&mut self) -> Quantity;

    /// Integer in `[MIN_STEP, MAX_STEP]`
    fn step(&mut self) -> u32;
}

/// Uniform draws from a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct UniformDraws {
    seed: u64,
    rng: StdRng,
    sizes: Uniform<Quantity>,
    steps: Uniform<u32>,
}

impl UniformDraws {
    /// Bounds are inclusive and may be given in either order
    pub fn new(low: Quantity, high: Quantity, seed: u64) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            sizes: Uniform::new_inclusive(low, high),
            steps: Uniform::new_inclusive(MIN_STEP, MAX_STEP),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl QuoteDraws for UniformDraws {
    fn size(&mut self) -> Quantity {
        self.sizes.sample(&mut self.rng)
    }

    fn step(&mut self) -> u32 {
        self.steps.sample(&mut self.rng)
    }
}

pub struct Randomized<D: QuoteDraws = UniformDraws> {
    low: Quantity,
    high: Quantity,
    draws: D,
}

impl Randomized<UniformDraws> {
    /// Sizes drawn from `[low, high]`, seeded per instance
    pub fn new(low: Quantity, high: Quantity) -> Self {
        Self::with_seed(low, high, instance_seed())
    }

    /// Reproducible variant
    pub fn with_seed(low: Quantity, high: Quantity, seed: u64) -> Self {
        Self::with_draws(low, high, UniformDraws::new(low, high, seed))
    }

    /// A fresh strategy with the same size range and its own seed
    pub fn fork(&self) -> Self {
        Self::new(self.low, self.high)
    }

    pub fn seed(&self) -> u64 {
        self.draws.seed()
    }
}

impl<D: QuoteDraws> Randomized<D> {
    pub fn with_draws(low: Quantity, high: Quantity, draws: D) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self { low, high, draws }
    }

    pub fn size_range(&self) -> (Quantity, Quantity) {
        (self.low, self.high)
    }
}

impl<D: QuoteDraws> Strategy for Randomized<D> {
    fn name(&self) -> &'static str {
        "randomized"
    }

    fn on_start(&mut self, agent: &mut AgentCore, implied: Price) -> AgentResult<()> {
        let spacing = self.draws.step();
        let count = self.draws.step();
        let stride = agent.ticks(spacing)?;
        debug!(
            "[{}] Quoting {} levels per side, {} ticks apart",
            agent.id(),
            count,
            spacing
        );

        let mut price = price_above(implied, Decimal::ONE)?;
        for level in 0..count {
            if level > 0 {
                price = price_above(price, stride)?;
            }
            agent.insert_sell(price, self.draws.size())?;
        }

        let mut price = price_below(implied, Decimal::ONE)?;
        for level in 0..count {
            if level > 0 {
                price = price_below(price, stride)?;
            }
            agent.insert_buy(price, self.draws.size())?;
        }
        Ok(())
    }

    fn on_fill(&mut self, agent: &mut AgentCore, fill: &LastFill) -> AgentResult<()> {
        let offset = agent.ticks(self.draws.step())?;
        let size = self.draws.size();
        if fill.was_buy() {
            agent.insert_buy(price_below(fill.price, offset)?, size)?;
        } else {
            agent.insert_sell(price_above(fill.price, offset)?, size)?;
        }
        Ok(())
    }
}
