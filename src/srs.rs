//! Super Rotation System (SRS) wall kick data
//!
//! SRS defines the wall kicks attempted when rotating a piece.
//! If a rotation would cause collision, these offsets are tried in order,
//! starting with the unkicked position.

use crate::board::Board;
use crate::piece::Piece;
use crate::tetromino::{KickClass, Rotation, RotationDirection};

/// A `(dx, dy)` offset added to the piece position, in board coordinates
pub type Kick = (i32, i32);

/// Result of a successful rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated {
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
}

const O_KICKS: [Kick; 1] = [(0, 0)];

/// Get wall kick offsets for a rotation from `from` to `to`
pub fn wall_kicks(class: KickClass, from: Rotation, to: Rotation) -> &'static [Kick] {
    match class {
        // O piece doesn't kick, it only tries its current position
        KickClass::O => &O_KICKS,
        KickClass::I => i_piece_kicks(from, to),
        KickClass::Jlstz => jlstz_kicks(from, to),
    }
}

/// Wall kicks for J, L, S, T, Z pieces
fn jlstz_kicks(from: Rotation, to: Rotation) -> &'static [Kick] {
    use Rotation::*;

    match (from, to) {
        (North, East) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        (East, North) => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        (East, South) => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        (South, East) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        (South, West) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        (West, South) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (West, North) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (North, West) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        // Not a quarter turn
        _ => &O_KICKS,
    }
}

/// Wall kicks for I piece (different from other pieces)
fn i_piece_kicks(from: Rotation, to: Rotation) -> &'static [Kick] {
    use Rotation::*;

    match (from, to) {
        (North, East) => &[(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
        (East, North) => &[(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
        (East, South) => &[(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
        (South, East) => &[(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
        (South, West) => &[(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
        (West, South) => &[(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
        (West, North) => &[(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
        (North, West) => &[(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
        _ => &O_KICKS,
    }
}

/// Try to rotate `piece` at `(x, y)` one step in `direction`.
///
/// Returns the first kicked placement that fits, or `None` if every
/// candidate collides.
pub fn try_rotate(
    board: &Board,
    piece: &Piece,
    x: i32,
    y: i32,
    direction: RotationDirection,
) -> Option<Rotated> {
    let new_rotation = piece.rotation.rotate(direction);
    let rotated = piece.with_rotation(new_rotation);

    wall_kicks(piece.piece_type.kick_class(), piece.rotation, new_rotation)
        .iter()
        .map(|&(dx, dy)| (x + dx, y + dy))
        .find(|&(kx, ky)| board.is_valid(&rotated, kx, ky, new_rotation))
        .map(|(x, y)| Rotated {
            rotation: new_rotation,
            x,
            y,
        })
}
