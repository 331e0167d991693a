//! Exhaustive per-cell evaluation.
//!
//! Every cell of the board is tried as a starting move on its own clone of
//! the board. The simulated chain is scored with the completion bonus and
//! the extra-moves estimate, producing one `SimulationResult` per cell in
//! row-major order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use super::heuristic::{completion_bonus, extra_moves};
use crate::board::{Board, Cursor};
use crate::simulate::{run_chain, SimError, SimLimits};

/// Outcome of playing one starting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub cursor: Cursor,
    /// Chain points plus completion bonus.
    pub points: i64,
    pub moves: u32,
    pub extra_moves: i64,
}

/// Results for every cell that produced a finite chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub results: Vec<SimulationResult>,
    /// Starting cells excluded because their chain hit the step cap.
    pub looped: Vec<Cursor>,
}

/// Errors that abort a whole board evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation exceeded its time budget")]
    Timeout,

    #[error("evaluation cancelled")]
    Cancelled,
}

/// Evaluates a single starting cell on a private clone of `board`.
pub fn evaluate_cell(
    board: &Board,
    cursor: Cursor,
    score: i64,
    limits: &SimLimits,
    stop: &AtomicBool,
) -> Result<SimulationResult, SimError> {
    if stop.load(Ordering::Relaxed) {
        return Err(SimError::Cancelled);
    }
    if let Some(deadline) = limits.deadline {
        if Instant::now() >= deadline {
            return Err(SimError::Timeout);
        }
    }

    let mut scratch = board.clone();
    let chain = run_chain(&mut scratch, cursor, limits, stop)?;
    let points = chain.points + completion_bonus(&scratch);
    let extra = extra_moves(chain.moves, score + points, scratch.width());

    Ok(SimulationResult {
        cursor,
        points,
        moves: chain.moves,
        extra_moves: extra,
    })
}

/// Evaluates every cell in parallel on the current rayon pool.
///
/// A timeout in any cell raises `stop`, cancelling the simulations still
/// running, and fails the whole evaluation.
pub fn evaluate_board(
    board: &Board,
    score: i64,
    limits: &SimLimits,
    stop: &AtomicBool,
) -> Result<Evaluation, EvalError> {
    let outcomes: Vec<(Cursor, Result<SimulationResult, SimError>)> = (0..board.len())
        .into_par_iter()
        .map(|i| {
            let cursor = board.cursor_at(i);
            let outcome = evaluate_cell(board, cursor, score, limits, stop);
            if outcome == Err(SimError::Timeout) {
                stop.store(true, Ordering::Relaxed);
            }
            (cursor, outcome)
        })
        .collect();

    collect_outcomes(outcomes)
}

/// Evaluates every cell one after another, stopping at the first timeout.
pub fn evaluate_board_sequential(
    board: &Board,
    score: i64,
    limits: &SimLimits,
    stop: &AtomicBool,
) -> Result<Evaluation, EvalError> {
    let mut outcomes = Vec::with_capacity(board.len());
    for cursor in board.cursors() {
        let outcome = evaluate_cell(board, cursor, score, limits, stop);
        let halt = matches!(outcome, Err(SimError::Timeout | SimError::Cancelled));
        outcomes.push((cursor, outcome));
        if halt {
            break;
        }
    }

    collect_outcomes(outcomes)
}

/// Splits per-cell outcomes into results and looped cells.
/// Timeout wins over cancellation when both occurred.
fn collect_outcomes(
    outcomes: Vec<(Cursor, Result<SimulationResult, SimError>)>,
) -> Result<Evaluation, EvalError> {
    let mut eval = Evaluation {
        results: Vec::with_capacity(outcomes.len()),
        looped: Vec::new(),
    };
    let mut cancelled = false;

    for (cursor, outcome) in outcomes {
        match outcome {
            Ok(result) => eval.results.push(result),
            Err(SimError::LoopDetected { .. }) => eval.looped.push(cursor),
            Err(SimError::Timeout) => return Err(EvalError::Timeout),
            Err(SimError::Cancelled) => cancelled = true,
        }
    }

    if cancelled {
        return Err(EvalError::Cancelled);
    }
    Ok(eval)
}
