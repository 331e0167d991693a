//! Board coordinates.

use serde::{Deserialize, Serialize};

use super::cell::Direction;

/// An (x, y) position. May point outside the board while a chain is
/// stepping; the board decides whether it is in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

impl Cursor {
    pub const fn new(x: i32, y: i32) -> Self {
        Cursor { x, y }
    }

    /// Returns the cursor one unit away in `direction`.
    pub const fn step(self, direction: Direction) -> Cursor {
        let (dx, dy) = direction.delta();
        Cursor {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_each_direction() {
        let c = Cursor::new(2, 3);
        assert_eq!(c.step(Direction::Left), Cursor::new(1, 3));
        assert_eq!(c.step(Direction::Right), Cursor::new(3, 3));
        assert_eq!(c.step(Direction::Up), Cursor::new(2, 2));
        assert_eq!(c.step(Direction::Down), Cursor::new(2, 4));
    }

    #[test]
    fn step_can_leave_origin() {
        let c = Cursor::new(0, 0);
        assert_eq!(c.step(Direction::Left), Cursor::new(-1, 0));
        assert_eq!(c.step(Direction::Up), Cursor::new(0, -1));
    }

    #[test]
    fn serializes_as_xy_object() {
        let json = serde_json::to_string(&Cursor::new(4, 1)).unwrap();
        assert_eq!(json, r#"{"x":4,"y":1}"#);
    }
}
