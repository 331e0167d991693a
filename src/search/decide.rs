//! One full decision cycle.
//!
//! Evaluates every starting cell under a wall-clock budget, applies the
//! chosen strategy, and reports progress as `info` lines on the protocol
//! writer.

use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use rayon::ThreadPool;

use super::strategy::{Strategy, StrategyError};
use crate::board::{Board, Cursor};
use crate::eval::{evaluate_board, evaluate_board_sequential, EvalError, SimulationResult};
use crate::simulate::SimLimits;

/// Limits and reporting switches for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecideLimits {
    /// Wall-clock budget for the whole evaluation.
    pub movetime: Duration,
    /// Step cap per chain; None derives it from the board size.
    pub max_steps: Option<u32>,
    /// Emit one `info candidate` line per evaluated cell.
    pub verbose: bool,
}

impl Default for DecideLimits {
    fn default() -> Self {
        DecideLimits {
            movetime: Duration::from_millis(5000),
            max_steps: None,
            verbose: false,
        }
    }
}

/// The chosen move and what it took to find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub cursor: Cursor,
    pub result: SimulationResult,
    pub evaluated: usize,
    pub looped: usize,
    pub elapsed_ms: u64,
}

/// Errors that abort a decision. The input board is untouched on every path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecideError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("every one of {0} starting cells hit the step cap")]
    LoopDetected(usize),
}

/// Chooses the next move for `board` at the given `score`.
///
/// Evaluates on `pool` when given, otherwise on the calling thread.
/// `stop` may be raised from another thread to cancel the evaluation.
pub fn decide<W: Write>(
    board: &Board,
    score: i64,
    strategy: Strategy,
    limits: &DecideLimits,
    pool: Option<&ThreadPool>,
    stop: &AtomicBool,
    out: &mut W,
) -> Result<Decision, DecideError> {
    let start = Instant::now();
    let sim_limits = SimLimits {
        max_steps: limits.max_steps,
        deadline: Some(start + limits.movetime),
    };

    let _ = writeln!(
        out,
        "info board {}x{} score {}",
        board.width(),
        board.height(),
        score
    );

    let eval = match pool {
        Some(pool) => pool.install(|| evaluate_board(board, score, &sim_limits, stop)),
        None => evaluate_board_sequential(board, score, &sim_limits, stop),
    }?;

    if limits.verbose {
        for r in &eval.results {
            let _ = writeln!(
                out,
                "info candidate x {} y {} points {} moves {} extra {}",
                r.cursor.x, r.cursor.y, r.points, r.moves, r.extra_moves
            );
        }
        for c in &eval.looped {
            let _ = writeln!(out, "info looped x {} y {}", c.x, c.y);
        }
    }

    if eval.results.is_empty() && !eval.looped.is_empty() {
        return Err(DecideError::LoopDetected(eval.looped.len()));
    }

    let chosen = *strategy.select(&eval.results)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let _ = writeln!(
        out,
        "info strategy {} cursor {} {} points {} moves {} extra {}",
        strategy,
        chosen.cursor.x,
        chosen.cursor.y,
        chosen.points,
        chosen.moves,
        chosen.extra_moves
    );
    let _ = writeln!(
        out,
        "info cells {} looped {} time {}",
        eval.results.len(),
        eval.looped.len(),
        elapsed_ms
    );

    Ok(Decision {
        cursor: chosen.cursor,
        result: chosen,
        evaluated: eval.results.len(),
        looped: eval.looped.len(),
        elapsed_ms,
    })
}
