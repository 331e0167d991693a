//! Cell contents and chain directions.
//!
//! Every cell carries a point value and a direction pointer. When a chain
//! consumes a fresh cell it continues in that cell's direction.

use serde::{Deserialize, Serialize};

/// One of the four cardinal directions a chain can travel in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// All directions, in a fixed order.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    /// Returns the unit (dx, dy) offset. `y` grows downwards.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub points: i64,
    pub direction: Direction,
    #[serde(default)]
    pub consumed: bool,
}

impl Cell {
    /// Creates an unconsumed cell.
    pub const fn new(points: i64, direction: Direction) -> Self {
        Cell {
            points,
            direction,
            consumed: false,
        }
    }

    /// Marks the cell consumed and returns what it yields: its points and
    /// the direction the chain continues in.
    pub fn consume(&mut self) -> (i64, Direction) {
        self.consumed = true;
        (self.points, self.direction)
    }
}
