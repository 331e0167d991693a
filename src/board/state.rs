//! Board representation.
//!
//! Holds a rectangular grid of cells in row-major order (y outer, x inner).
//! Cloning a board clones every cell, so a clone can be consumed freely
//! without touching the original.

use super::cell::Cell;
use super::cursor::Cursor;

/// Longest allowed side of a board.
pub const MAX_SIDE: usize = 1 << 16;

/// Largest magnitude accepted for a score or for the summed points of a
/// board. Every total the engine derives from these stays well inside `i64`.
pub const MAX_POINTS: i64 = 1 << 53;

/// Errors raised when a grid does not describe a usable board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board has no rows")]
    Empty,

    #[error("row {0} has no cells")]
    EmptyRow(usize),

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("board dimensions {0}x{1} exceed 65536 per side")]
    TooLarge(usize, usize),

    #[error("cell points exceed 2^53 in total")]
    PointsOutOfRange,
}

/// A rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from rows of cells.
    ///
    /// Width is taken from row 0 and every other row must match it. The
    /// absolute cell points may add up to at most `MAX_POINTS`.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = match rows.first() {
            Some(row) => row.len(),
            None => return Err(BoardError::Empty),
        };
        if width == 0 {
            return Err(BoardError::EmptyRow(0));
        }
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(BoardError::TooLarge(width, height));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.is_empty() {
                return Err(BoardError::EmptyRow(y));
            }
            if row.len() != width {
                return Err(BoardError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }

        let total = cells
            .iter()
            .try_fold(0u64, |acc, c| acc.checked_add(c.points.unsigned_abs()));
        match total {
            Some(t) if t <= MAX_POINTS as u64 => {}
            _ => return Err(BoardError::PointsOutOfRange),
        }

        Ok(Board {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a board built by `from_rows`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the flat index for a cursor, or None when it is off the board.
    pub fn index_of(&self, cursor: Cursor) -> Option<usize> {
        if cursor.x < 0 || cursor.y < 0 {
            return None;
        }
        let (x, y) = (cursor.x as usize, cursor.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Returns the cursor for a flat index.
    pub fn cursor_at(&self, index: usize) -> Cursor {
        Cursor::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn contains(&self, cursor: Cursor) -> bool {
        self.index_of(cursor).is_some()
    }

    /// Returns the cell at `cursor`, or None when it is off the board.
    pub fn get(&self, cursor: Cursor) -> Option<&Cell> {
        self.index_of(cursor).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, cursor: Cursor) -> Option<&mut Cell> {
        match self.index_of(cursor) {
            Some(i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    /// Iterates all cursors in row-major order.
    pub fn cursors(&self) -> impl Iterator<Item = Cursor> + '_ {
        (0..self.cells.len()).map(move |i| self.cursor_at(i))
    }

    /// Iterates rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Number of rows whose every cell is consumed.
    pub fn full_rows(&self) -> usize {
        self.rows()
            .filter(|row| row.iter().all(|c| c.consumed))
            .count()
    }

    /// Number of columns whose every cell is consumed.
    pub fn full_cols(&self) -> usize {
        (0..self.width)
            .filter(|&x| (0..self.height).all(|y| self.cells[y * self.width + x].consumed))
            .count()
    }

    /// Number of consumed cells.
    pub fn consumed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.consumed).count()
    }

    /// Copies the board back out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}
