//! Scoring heuristics applied on top of a simulated chain.
//!
//! The completion bonus rewards rows and columns a chain consumes entirely.
//! The extra-moves estimate measures how far a chain's length exceeds a
//! threshold that grows with the projected score and shrinks with the
//! board size.

use crate::board::Board;

/// Bonus points per cell of board width, for each full row or column.
pub const LINE_BONUS_PER_WIDTH: i64 = 10;

/// Divisor applied to `width^2` when scaling the projected score.
pub const SCORE_SCALE: i64 = 5;

/// Returns the completion bonus for a consumed board:
/// `(full_rows + full_cols) * width * 10`.
pub fn completion_bonus(board: &Board) -> i64 {
    let lines = (board.full_rows() + board.full_cols()) as i64;
    lines * board.width() as i64 * LINE_BONUS_PER_WIDTH
}

/// Chain length a move needs before it earns extra moves, given the score
/// the player would have after it.
pub fn extra_moves_threshold(projected_score: i64, width: usize) -> i64 {
    let width = width as i64;
    projected_score.div_euclid(SCORE_SCALE * width * width) + width - 1
}

/// Returns how many moves the chain runs past the threshold, or 0.
pub fn extra_moves(chain_length: u32, projected_score: i64, width: usize) -> i64 {
    let threshold = extra_moves_threshold(projected_score, width);
    let length = i64::from(chain_length);
    if length >= threshold {
        length - threshold
    } else {
        0
    }
}
