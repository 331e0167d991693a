//! Move evaluation.
//!
//! Plays every starting cell on an isolated copy of the board and scores
//! the resulting chain, including completion bonuses and the extra-moves
//! estimate.

pub mod evaluator;
pub mod heuristic;

pub use evaluator::{
    evaluate_board, evaluate_board_sequential, evaluate_cell, EvalError, Evaluation,
    SimulationResult,
};
pub use heuristic::{completion_bonus, extra_moves, extra_moves_threshold};
