//! stackfall - a falling-block puzzle engine
//!
//! The library is the deterministic game core: board, pieces, SRS rotation,
//! the 7-bag randomizer, scoring and frame-stepped timing. Front ends drive a
//! [`Game`] with actions and one [`Game::update`] per 60 Hz frame, and draw
//! from [`Game::snapshot`].

pub mod bag;
pub mod board;
pub mod config;
pub mod game;
pub mod input;
pub mod piece;
pub mod score;
pub mod snapshot;
pub mod srs;
pub mod tetromino;

pub use board::{Board, Cell};
pub use config::{ConfigError, EngineConfig, ScoreValues};
pub use game::{Action, Game};
pub use snapshot::{ActivePiece, GameSnapshot};
pub use tetromino::{Rotation, RotationDirection, TetrominoType};
