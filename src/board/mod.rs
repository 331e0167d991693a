//! Board representation.
//!
//! Contains the cell, direction, cursor, and grid types the simulator
//! and evaluator operate on.

pub mod cell;
pub mod cursor;
pub mod state;

pub use cell::{Cell, Direction, ALL_DIRECTIONS};
pub use cursor::Cursor;
pub use state::{Board, BoardError, MAX_POINTS, MAX_SIDE};
