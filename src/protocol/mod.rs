//! Line protocol handling.
//!
//! This module implements the command parser for the main loop and the
//! JSON encoding used for game states and chosen moves.

pub mod json;
pub mod parser;

pub use json::{format_move, parse_position, JsonError, Position};
pub use parser::{parse_command, Command, GoParams};
