//! Tetromino definitions and shapes
//!
//! All 7 standard tetrominoes with their four SRS rotation states. Shapes are
//! fixed lookup tables of `(row, col)` cells inside the piece's bounding box,
//! with row 0 at the top of the box and rows increasing downward.

use serde::{Deserialize, Serialize};

/// The 4 occupied `(row, col)` cells of a piece inside its bounding box
pub type Shape = [(i32, i32); 4];

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T, // T-shape
    S, // S-shape
    Z, // Z-shape
    J, // J-shape
    L, // L-shape
}

/// Which SRS wall kick table a piece uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickClass {
    I,
    O,
    Jlstz,
}

impl TetrominoType {
    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Single-letter display identifier
    pub fn symbol(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::O => 'O',
            TetrominoType::T => 'T',
            TetrominoType::S => 'S',
            TetrominoType::Z => 'Z',
            TetrominoType::J => 'J',
            TetrominoType::L => 'L',
        }
    }

    pub fn kick_class(&self) -> KickClass {
        match self {
            TetrominoType::I => KickClass::I,
            TetrominoType::O => KickClass::O,
            _ => KickClass::Jlstz,
        }
    }

    /// Get the occupied cells for this tetromino at a given rotation
    pub fn shape(&self, rotation: Rotation) -> &'static Shape {
        let table = match self {
            TetrominoType::I => &I_SHAPES,
            TetrominoType::O => &O_SHAPES,
            TetrominoType::T => &T_SHAPES,
            TetrominoType::S => &S_SHAPES,
            TetrominoType::Z => &Z_SHAPES,
            TetrominoType::J => &J_SHAPES,
            TetrominoType::L => &L_SHAPES,
        };
        &table[rotation.index()]
    }
}

// I piece - 4x4 box
// North: ....   East: ..I.   South: ....   West: .I..
//        IIII         ..I.          ....         .I..
//        ....         ..I.          IIII         .I..
//        ....         ..I.          ....         .I..
const I_SHAPES: [Shape; 4] = [
    [(1, 0), (1, 1), (1, 2), (1, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 1), (1, 1), (2, 1), (3, 1)],
];

// O piece doesn't change between rotations; it sits in the middle of a 4-wide box
const O_SHAPES: [Shape; 4] = [[(0, 1), (0, 2), (1, 1), (1, 2)]; 4];

const T_SHAPES: [Shape; 4] = [
    [(0, 1), (1, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 1)],
    [(0, 1), (1, 0), (1, 1), (2, 1)],
];

// North: .SS    East: .S.   South: ...   West: S..
//        SS.          .SS          .SS         SS.
//                     ..S          SS.         .S.
const S_SHAPES: [Shape; 4] = [
    [(0, 1), (0, 2), (1, 0), (1, 1)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 1), (1, 2), (2, 0), (2, 1)],
    [(0, 0), (1, 0), (1, 1), (2, 1)],
];

// North: ZZ.    East: ..Z   South: ...   West: .Z.
//        .ZZ          .ZZ          ZZ.         ZZ.
//                     .Z.          .ZZ         Z..
const Z_SHAPES: [Shape; 4] = [
    [(0, 0), (0, 1), (1, 1), (1, 2)],
    [(0, 2), (1, 1), (1, 2), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(0, 1), (1, 0), (1, 1), (2, 0)],
];

const J_SHAPES: [Shape; 4] = [
    [(0, 0), (1, 0), (1, 1), (1, 2)],
    [(0, 1), (0, 2), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 0), (2, 1)],
];

const L_SHAPES: [Shape; 4] = [
    [(0, 2), (1, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (1, 2), (2, 0)],
    [(0, 0), (0, 1), (1, 1), (2, 1)],
];

/// Rotation states (using SRS naming convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    pub fn all() -> [Rotation; 4] {
        [Rotation::North, Rotation::East, Rotation::South, Rotation::West]
    }

    /// Rotation index in 0..4
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    pub fn from_index(index: usize) -> Rotation {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    /// Apply a rotation direction: `(current + direction) mod 4`
    pub fn rotate(&self, direction: RotationDirection) -> Rotation {
        Rotation::from_index((self.index() as i32 + direction.delta()).rem_euclid(4) as usize)
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// +1 for clockwise, -1 for counter-clockwise
    pub fn delta(&self) -> i32 {
        match self {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => -1,
        }
    }
}
