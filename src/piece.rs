//! Active falling piece

use crate::tetromino::{Rotation, Shape, TetrominoType};

/// An active piece: its type and current rotation state.
///
/// The piece's position lives with its owner (the game), as the top-left
/// corner of the bounding box. The row may be negative while the piece is
/// still partly above the visible board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current rotation state
    pub rotation: Rotation,
}

impl Piece {
    /// Create a new piece in its spawn rotation
    pub fn new(piece_type: TetrominoType) -> Self {
        Self {
            piece_type,
            rotation: Rotation::North,
        }
    }

    /// The same piece in a different rotation state
    pub fn with_rotation(&self, rotation: Rotation) -> Self {
        Self {
            piece_type: self.piece_type,
            rotation,
        }
    }

    /// Shape table for the current rotation
    pub fn shape(&self) -> &'static Shape {
        self.piece_type.shape(self.rotation)
    }

    /// Absolute `(row, col)` board cells of this piece at `(x, y)` in `rotation`
    pub fn cells_at(&self, x: i32, y: i32, rotation: Rotation) -> [(i32, i32); 4] {
        self.piece_type
            .shape(rotation)
            .map(|(dr, dc)| (y + dr, x + dc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_piece_spawns_north() {
        let piece = Piece::new(TetrominoType::T);
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn test_cells_at_offsets_shape() {
        let piece = Piece::new(TetrominoType::I);
        let cells = piece.cells_at(3, -1, Rotation::North);
        assert_eq!(cells, [(0, 3), (0, 4), (0, 5), (0, 6)]);

        let cells = piece.cells_at(3, -1, Rotation::East);
        assert_eq!(cells, [(-1, 5), (0, 5), (1, 5), (2, 5)]);
    }

    #[test]
    fn test_with_rotation_keeps_type() {
        let piece = Piece::new(TetrominoType::L).with_rotation(Rotation::South);
        assert_eq!(piece.piece_type, TetrominoType::L);
        assert_eq!(piece.shape(), TetrominoType::L.shape(Rotation::South));
    }
}
