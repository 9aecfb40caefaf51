//! Fleet configuration
//!
//! Declarative description of a set of agents, loaded from JSON and built
//! through the factory functions.

use std::path::Path;

use mmkit_core::Quantity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factory::{self, Agents};
use crate::randomized::Randomized;
use crate::simple_grid::SimpleGrid;
use crate::strategy::AgentHandle;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Fleet has no agents")]
    EmptyFleet,
    #[error("Invalid fleet entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}

fn one() -> usize {
    1
}

/// One group of identical agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FleetEntry {
    Passive {
        #[serde(default = "one")]
        count: usize,
    },
    SimpleGrid {
        #[serde(default = "one")]
        count: usize,
        size: Quantity,
        #[serde(default)]
        requote_on_fill: bool,
    },
    Randomized {
        #[serde(default = "one")]
        count: usize,
        low: Quantity,
        high: Quantity,
        /// Base seed; agent `i` of the group uses `seed + i`
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl FleetEntry {
    pub fn count(&self) -> usize {
        match self {
            FleetEntry::Passive { count }
            | FleetEntry::SimpleGrid { count, .. }
            | FleetEntry::Randomized { count, .. } => *count,
        }
    }

    fn build(&self) -> Agents {
        match *self {
            FleetEntry::Passive { count } => factory::passive_n(count),
            FleetEntry::SimpleGrid {
                count,
                size,
                requote_on_fill,
            } => (0..count)
                .map(|_| AgentHandle::new(SimpleGrid::new(size).with_requote(requote_on_fill)))
                .collect(),
            FleetEntry::Randomized {
                count,
                low,
                high,
                seed: None,
            } => factory::randomized_n(count, low, high),
            FleetEntry::Randomized {
                count,
                low,
                high,
                seed: Some(seed),
            } => (0..count)
                .map(|i| {
                    let seed = seed.wrapping_add(i as u64);
                    AgentHandle::new(Randomized::with_seed(low, high, seed))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub agents: Vec<FleetEntry>,
}

/// Load a fleet from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FleetConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load a fleet from a JSON string
pub fn load_config_from_str(json: &str) -> Result<FleetConfig, ConfigError> {
    let config: FleetConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the embedded default fleet
pub fn load_default_config() -> Result<FleetConfig, ConfigError> {
    load_config_from_str(include_str!("config/default_fleet.json"))
}

impl FleetConfig {
    /// Total number of agents the fleet describes
    pub fn agent_count(&self) -> usize {
        self.agents.iter().map(FleetEntry::count).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count() == 0 {
            return Err(ConfigError::EmptyFleet);
        }

        for (index, entry) in self.agents.iter().enumerate() {
            let reason = match *entry {
                FleetEntry::SimpleGrid { size: 0, .. } => Some("size must be positive"),
                FleetEntry::Randomized { low, high, .. } if low.min(high) == 0 => {
                    Some("size range must be positive")
                }
                _ => None,
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidEntry {
                    index,
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validate, then construct every agent in declaration order
    pub fn build(&self) -> Result<Agents, ConfigError> {
        self.validate()?;
        let mut agents = Agents::with_capacity(self.agent_count());
        for entry in &self.agents {
            agents.extend(entry.build());
        }
        Ok(agents)
    }
}
