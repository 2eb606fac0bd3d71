//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::{Rotation, TetrominoType};

/// Standard Tetris board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled by a piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// The piece type occupying this cell, if any
    pub fn piece_type(&self) -> Option<TetrominoType> {
        match self {
            Cell::Empty => None,
            Cell::Filled(t) => Some(*t),
        }
    }
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Grid stored as [row][col], row 0 is the top visible row, rows increase downward
    cells: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        Self {
            width,
            height,
            cells: vec![vec![Cell::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the cell at a position (row, col)
    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.cells
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
    }

    /// Set a cell at a position
    /// Returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        match self
            .cells
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Check whether `piece` fits at `(x, y)` in `rotation`.
    ///
    /// Every cell must be inside the side walls and above the floor. Cells
    /// above the top of the board (negative rows) only need to be in bounds
    /// horizontally; all other cells must be empty.
    pub fn is_valid(&self, piece: &Piece, x: i32, y: i32, rotation: Rotation) -> bool {
        piece.cells_at(x, y, rotation).iter().all(|&(row, col)| {
            if col < 0 || col >= self.width as i32 || row >= self.height as i32 {
                return false;
            }
            row < 0 || self.cells[row as usize][col as usize].is_empty()
        })
    }

    /// Lock a piece onto the board.
    ///
    /// Cells above the top row are dropped.
    ///
    /// # Panics
    ///
    /// Panics if any cell is outside the side walls or below the floor; the
    /// caller must only place positions that passed [`Board::is_valid`].
    pub fn place(&mut self, piece: &Piece, x: i32, y: i32, rotation: Rotation) {
        for (row, col) in piece.cells_at(x, y, rotation) {
            assert!(
                col >= 0 && (col as usize) < self.width && (row as i64) < self.height as i64,
                "placing {:?} outside the board at ({}, {})",
                piece.piece_type,
                row,
                col
            );
            if row >= 0 {
                self.cells[row as usize][col as usize] = Cell::Filled(piece.piece_type);
            }
        }
    }

    /// Clear completed lines and return the number cleared.
    ///
    /// All full rows are removed at once; the remaining rows keep their
    /// order and settle to the bottom, with empty rows filling the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut lines_cleared = 0;
        let mut write_row = self.height;

        for read_row in (0..self.height).rev() {
            if self.is_line_full(read_row) {
                lines_cleared += 1;
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells.swap(write_row, read_row);
            }
        }

        // Fill the top with empty rows
        for row in &mut self.cells[..write_row] {
            row.fill(Cell::Empty);
        }

        lines_cleared
    }

    /// Restore an all-empty grid
    pub fn reset(&mut self) {
        for row in &mut self.cells {
            row.fill(Cell::Empty);
        }
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(|row| row.as_slice())
    }
}
