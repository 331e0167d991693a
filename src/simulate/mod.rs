//! Chain reaction simulation.

pub mod chain;

pub use chain::{default_step_cap, run_chain, simulate_chain, ChainOutcome, SimError, SimLimits};
