//! JSON game-state decoding and move encoding.
//!
//! The game server describes a turn as
//! `{"board": [[{"points": 5, "direction": "left"}, ...], ...], "score": 10, "moves": 7}`
//! and expects the chosen move back as `{"x": 1, "y": 2}`.

use serde::Deserialize;

use crate::board::{Board, BoardError, Cell, Cursor, MAX_POINTS};

/// Errors that can occur while decoding a game state.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("invalid game state JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    #[error("score {0} outside the accepted range")]
    ScoreOutOfRange(i64),
}

/// Wire shape of a game state.
#[derive(Debug, Clone, Deserialize)]
struct GameStateInput {
    board: Vec<Vec<Cell>>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    moves: Option<u32>,
}

/// A decoded, validated turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub score: i64,
    /// Moves the server says remain; informational only.
    pub moves: Option<u32>,
}

/// Decodes and validates a game-state object.
pub fn parse_position(json: &str) -> Result<Position, JsonError> {
    let input: GameStateInput = serde_json::from_str(json)?;
    if input.score.unsigned_abs() > MAX_POINTS as u64 {
        return Err(JsonError::ScoreOutOfRange(input.score));
    }
    let board = Board::from_rows(input.board)?;
    Ok(Position {
        board,
        score: input.score,
        moves: input.moves,
    })
}

/// Encodes a move as the `{"x":..,"y":..}` object the server expects.
pub fn format_move(cursor: Cursor) -> String {
    serde_json::json!({ "x": cursor.x, "y": cursor.y }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;

    #[test]
    fn parses_full_game_state() {
        let json = r#"{
            "board": [
                [{"points": 5, "direction": "left"}, {"points": 2, "direction": "down"}],
                [{"points": 1, "direction": "up"}, {"points": 3, "direction": "right"}]
            ],
            "score": 120,
            "moves": 7
        }"#;
        let pos = parse_position(json).unwrap();
        assert_eq!(pos.score, 120);
        assert_eq!(pos.moves, Some(7));
        assert_eq!(pos.board.width(), 2);
        assert_eq!(pos.board.height(), 2);
        assert_eq!(
            pos.board.get(Cursor::new(1, 0)),
            Some(&Cell::new(2, Direction::Down))
        );
    }

    #[test]
    fn score_and_moves_are_optional() {
        let pos = parse_position(r#"{"board": [[{"points": 1, "direction": "up"}]]}"#).unwrap();
        assert_eq!(pos.score, 0);
        assert_eq!(pos.moves, None);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = parse_position(r#"{"board": [[{"points": 1, "direction": "north"}]]}"#)
            .unwrap_err();
        assert!(matches!(err, JsonError::Parse(_)));
    }

    #[test]
    fn rejects_missing_cell_fields() {
        let err = parse_position(r#"{"board": [[{"direction": "up"}]]}"#).unwrap_err();
        assert!(matches!(err, JsonError::Parse(_)));
        let err = parse_position(r#"{"board": [[{"points": 3}]]}"#).unwrap_err();
        assert!(matches!(err, JsonError::Parse(_)));
    }

    #[test]
    fn rejects_ragged_and_empty_boards() {
        let err = parse_position(
            r#"{"board": [[{"points": 1, "direction": "up"}], []]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JsonError::Board(BoardError::EmptyRow(1))));

        let err = parse_position(r#"{"board": []}"#).unwrap_err();
        assert!(matches!(err, JsonError::Board(BoardError::Empty)));

        let err = parse_position(
            r#"{"board": [[{"points": 1, "direction": "up"}, {"points": 1, "direction": "up"}],
                          [{"points": 1, "direction": "up"}]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JsonError::Board(BoardError::Ragged { row: 1, .. })));
    }

    #[test]
    fn rejects_out_of_range_points_and_score() {
        let err = parse_position(
            r#"{"board": [[{"points": 9223372036854775807, "direction": "right"},
                          {"points": 9223372036854775807, "direction": "right"}]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JsonError::Board(BoardError::PointsOutOfRange)));

        let err = parse_position(
            r#"{"board": [[{"points": 1, "direction": "up"}]], "score": -9223372036854775808}"#,
        )
        .unwrap_err();
        assert!(matches!(err, JsonError::ScoreOutOfRange(i64::MIN)));

        let edge = format!(
            r#"{{"board": [[{{"points": {}, "direction": "up"}}]], "score": {}}}"#,
            MAX_POINTS, -MAX_POINTS
        );
        assert!(parse_position(&edge).is_ok());
    }

    #[test]
    fn formats_move_object() {
        assert_eq!(format_move(Cursor::new(3, 0)), r#"{"x":3,"y":0}"#);
    }
}
