//! Chain simulation.
//!
//! Follows a chain from a consumed starting cell until the cursor steps off
//! the board. Fresh cells add their points and redirect the chain; consumed
//! cells are crossed in the incoming direction for zero points. Every step
//! counts as a move either way.
//!
//! Direction only changes on a fresh cell, so after the last fresh cell the
//! chain runs straight and must leave the board. That bounds every chain by
//! `width * height * (max(width, height) + 1)` moves, which is the default
//! step cap. A chain exceeding its cap is reported as a loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::board::{Board, Cursor, Direction};

/// Errors that stop a single chain simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("chain still on the board after {steps} moves")]
    LoopDetected { steps: u32 },

    #[error("decision deadline passed during simulation")]
    Timeout,

    #[error("simulation cancelled")]
    Cancelled,
}

/// Bounds applied to one simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimLimits {
    /// Maximum moves before the chain counts as a loop. None uses the
    /// board-derived bound.
    pub max_steps: Option<u32>,
    /// Wall-clock deadline shared by every simulation of one decision.
    pub deadline: Option<Instant>,
}

impl SimLimits {
    /// Returns the step cap that applies on `board`.
    pub fn step_cap(&self, board: &Board) -> u32 {
        self.max_steps.unwrap_or_else(|| default_step_cap(board))
    }
}

/// Longest chain the rules allow on `board`, saturating at `u32::MAX`.
pub fn default_step_cap(board: &Board) -> u32 {
    let side = board.width().max(board.height()) as u64;
    let cap = (board.len() as u64).saturating_mul(side + 1);
    u32::try_from(cap).unwrap_or(u32::MAX)
}

/// Points and moves collected by one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    pub points: i64,
    pub moves: u32,
}

/// Consumes the cell at `start` and simulates the chain it triggers.
///
/// A start off the board yields an empty chain.
pub fn run_chain(
    board: &mut Board,
    start: Cursor,
    limits: &SimLimits,
    stop: &AtomicBool,
) -> Result<ChainOutcome, SimError> {
    let (points, direction) = match board.get_mut(start) {
        Some(cell) => cell.consume(),
        None => return Ok(ChainOutcome::default()),
    };
    simulate_chain(board, start, direction, points, limits, stop)
}

/// Continues a chain from `start`, which must already be consumed.
///
/// `points` is what the start cell yielded; the move count starts at 1 to
/// account for it.
pub fn simulate_chain(
    board: &mut Board,
    start: Cursor,
    direction: Direction,
    points: i64,
    limits: &SimLimits,
    stop: &AtomicBool,
) -> Result<ChainOutcome, SimError> {
    let cap = limits.step_cap(board);
    let mut cursor = start;
    let mut direction = direction;
    let mut points = points;
    let mut moves: u32 = 1;

    loop {
        // Check stop flag and deadline periodically (every 64 moves)
        if moves & 63 == 0 {
            if stop.load(Ordering::Relaxed) {
                return Err(SimError::Cancelled);
            }
            if let Some(deadline) = limits.deadline {
                if Instant::now() >= deadline {
                    return Err(SimError::Timeout);
                }
            }
        }

        let next = cursor.step(direction);
        let cell = match board.get_mut(next) {
            Some(cell) => cell,
            None => return Ok(ChainOutcome { points, moves }),
        };

        if !cell.consumed {
            let (gained, turn) = cell.consume();
            points += gained;
            direction = turn;
        }

        moves += 1;
        cursor = next;

        if moves > cap {
            return Err(SimError::LoopDetected { steps: moves });
        }
    }
}
