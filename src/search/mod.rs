//! Move selection.
//!
//! Runs the per-cell evaluation for a position and picks one starting cell
//! with a named strategy.

pub mod decide;
pub mod strategy;

pub use decide::{decide, DecideError, DecideLimits, Decision};
pub use strategy::{Strategy, StrategyError, ALL_STRATEGIES};
