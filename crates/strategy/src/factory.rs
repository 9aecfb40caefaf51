//! Agent Factory
//!
//! Bulk constructors returning collections of uniquely owned agents, and a
//! destructive merge of two collections.

use mmkit_core::Quantity;

use crate::passive::{ExternalCallback, Passive};
use crate::randomized::Randomized;
use crate::simple_grid::SimpleGrid;
use crate::strategy::AgentHandle;

/// Ordered collection of independently owned agents
pub type Agents = Vec<AgentHandle>;

/// One passive agent per external callback
pub fn passive(callbacks: impl IntoIterator<Item = ExternalCallback>) -> Agents {
    callbacks
        .into_iter()
        .map(|cb| AgentHandle::new(Passive::boxed(cb)))
        .collect()
}

/// `n` passive agents with no external callback
pub fn passive_n(n: usize) -> Agents {
    (0..n).map(|_| AgentHandle::new(Passive::new())).collect()
}

/// One simple-grid agent per quote size
pub fn simple_grid(sizes: impl IntoIterator<Item = Quantity>) -> Agents {
    sizes
        .into_iter()
        .map(|size| AgentHandle::new(SimpleGrid::new(size)))
        .collect()
}

pub fn simple_grid_n(n: usize, size: Quantity) -> Agents {
    (0..n).map(|_| AgentHandle::new(SimpleGrid::new(size))).collect()
}

/// One randomized agent per `(low, high)` size range
pub fn randomized(ranges: impl IntoIterator<Item = (Quantity, Quantity)>) -> Agents {
    ranges
        .into_iter()
        .map(|(low, high)| AgentHandle::new(Randomized::new(low, high)))
        .collect()
}

pub fn randomized_n(n: usize, low: Quantity, high: Quantity) -> Agents {
    (0..n)
        .map(|_| AgentHandle::new(Randomized::new(low, high)))
        .collect()
}

/// Move every agent of `left` then `right` into a new collection.
///
/// Both inputs are left empty; no agent is duplicated.
pub fn merge(left: &mut Agents, right: &mut Agents) -> Agents {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    merged.append(left);
    merged.append(right);
    merged
}
