//! The 6x9 Connect-5 grid.
//!
//! Row 0 is the top of the board and row 5 the bottom. Tiles fall under
//! gravity, so every column is filled from row 5 upward and empty cells in a
//! column always sit above the occupied ones.

use crate::{Tile, COLS, ROWS, WIN_LENGTH};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("column {0} is outside the board")]
    InvalidColumn(i32),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("cell ({row}, {col}) is outside the board")]
    InvalidCell { row: usize, col: usize },
}

/// Step directions for win detection as (row delta, column delta).
const DIRECTIONS: [(isize, isize); 4] = [
    // horizontal
    (0, 1),
    // vertical
    (1, 0),
    // rising diagonal
    (-1, 1),
    // falling diagonal
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Tile>; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// Returns the tile at a cell, `None` when empty or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Validates a raw column index coming off the wire or from user input.
    pub fn column_index(col: i32) -> Result<usize, MoveError> {
        usize::try_from(col)
            .ok()
            .filter(|&c| c < COLS)
            .ok_or(MoveError::InvalidColumn(col))
    }

    /// A column is full once its top cell is occupied.
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= COLS || self.cells[0][col].is_some()
    }

    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Lowest empty row in `col`, scanning from the bottom row upward.
    pub fn landing_row(&self, col: i32) -> Result<usize, MoveError> {
        let col = Self::column_index(col)?;
        (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col].is_none())
            .ok_or(MoveError::ColumnFull(col))
    }

    /// Drops `tile` into `col` and returns the row it landed on.
    ///
    /// The board is left untouched on error.
    pub fn drop_tile(&mut self, col: i32, tile: Tile) -> Result<usize, MoveError> {
        let row = self.landing_row(col)?;
        self.cells[row][col as usize] = Some(tile);
        Ok(row)
    }

    /// Writes a tile at an exact cell. Used by client mirrors applying a
    /// placement the server already decided.
    pub fn place(&mut self, row: usize, col: usize, tile: Tile) -> Result<(), MoveError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(MoveError::InvalidCell { row, col })?;
        *cell = Some(tile);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells = [[None; COLS]; ROWS];
    }

    pub fn tile_count(&self, tile: Tile) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell == Some(tile))
            .count()
    }

    /// True if `tile` occupies five consecutive cells horizontally,
    /// vertically or along either diagonal.
    pub fn has_five(&self, tile: Tile) -> bool {
        if self.tile_count(tile) < WIN_LENGTH {
            return false;
        }

        for row in 0..ROWS {
            for col in 0..COLS {
                for &(dr, dc) in &DIRECTIONS {
                    if self.window_matches(row, col, dr, dc, tile) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn window_matches(&self, row: usize, col: usize, dr: isize, dc: isize, tile: Tile) -> bool {
        (0..WIN_LENGTH as isize).all(|step| {
            let r = row as isize + dr * step;
            let c = col as isize + dc * step;
            r >= 0
                && c >= 0
                && (r as usize) < ROWS
                && (c as usize) < COLS
                && self.cells[r as usize][c as usize] == Some(tile)
        })
    }

    /// Checks the gravity invariant: no column has an empty cell beneath an
    /// occupied one.
    pub fn is_settled(&self) -> bool {
        (0..COLS).all(|col| {
            let mut seen_tile = false;
            (0..ROWS).all(|row| {
                let occupied = self.cells[row][col].is_some();
                let ok = occupied || !seen_tile;
                seen_tile |= occupied;
                ok
            })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
