//! mmkit Core Domain
//!
//! Pure value types shared by the market-maker agents and the book port.
//! This crate contains no I/O and no interior mutability.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{LastFill, OrderId, OrderRecord, Side};
pub use values::{Price, Quantity};
