//! Read-only view of the game handed to renderers

use serde::Serialize;

use crate::tetromino::{Rotation, Shape, TetrominoType};

/// The falling piece as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivePiece {
    pub piece_type: TetrominoType,
    pub rotation: Rotation,
    /// Occupied `(row, col)` cells inside the bounding box
    pub shape: Shape,
    /// Bounding box top-left; `y` may be negative above the board
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Absolute `(row, col)` board cells
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.cells_at_row(self.y)
    }

    fn cells_at_row(&self, y: i32) -> [(i32, i32); 4] {
        self.shape.map(|(dr, dc)| (y + dr, self.x + dc))
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Placed blocks, row 0 at the top
    pub board: Vec<Vec<Option<TetrominoType>>>,
    pub active: ActivePiece,
    /// Row the active piece would land on if dropped straight down
    pub ghost_y: i32,
    pub held: Option<TetrominoType>,
    pub next: Vec<TetrominoType>,
    pub score: u64,
    pub lines: u32,
    pub level: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    /// Absolute cells of the ghost piece
    pub fn ghost_cells(&self) -> [(i32, i32); 4] {
        self.active.cells_at_row(self.ghost_y)
    }

    /// Type of the placed block at `(row, col)`, `None` when empty or out of bounds
    pub fn cell(&self, row: i32, col: i32) -> Option<TetrominoType> {
        if row < 0 || col < 0 {
            return None;
        }
        self.board
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .flatten()
    }
}
