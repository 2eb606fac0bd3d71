//! Engine configuration constants
//!
//! Everything the engine treats as a fixed external parameter: board size,
//! timing tables, scoring values. Loaded from the `engine` section of the
//! settings file, so every field has a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};

/// Frames per one-row gravity step, indexed by level - 1 (60 frames per second)
pub const DEFAULT_GRAVITY_FRAMES: [u32; 30] = [
    48, 43, 38, 33, 28, 23, 18, 13, 8, 6, 5, 5, 5, 4, 4, 4, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    1,
];

/// Point values awarded by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreValues {
    pub single: u64,
    pub double: u64,
    pub triple: u64,
    pub tetris: u64,
    /// Per cell of a successful soft drop
    pub soft_drop: u64,
    /// Per cell of a hard drop
    pub hard_drop: u64,
}

impl Default for ScoreValues {
    fn default() -> Self {
        Self {
            single: 100,
            double: 300,
            triple: 500,
            tetris: 800,
            soft_drop: 1,
            hard_drop: 2,
        }
    }
}

impl ScoreValues {
    /// Base value for clearing `lines` rows at once
    pub fn for_lines(&self, lines: usize) -> u64 {
        match lines {
            1 => self.single,
            2 => self.double,
            3 => self.triple,
            4 => self.tetris,
            _ => 0,
        }
    }
}

/// Engine parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Gravity period in frames per level; levels past the end use the last entry
    pub gravity_frames: Vec<u32>,
    /// Frames a grounded piece waits before locking
    pub lock_delay_frames: u32,
    /// Delayed auto shift: frames a key must be held before repeating
    pub das_frames: u32,
    /// Auto repeat rate: frames between repeats once DAS has elapsed
    pub arr_frames: u32,
    pub scores: ScoreValues,
    pub lines_per_level: u32,
    /// Number of upcoming pieces exposed in the snapshot
    pub preview_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            gravity_frames: DEFAULT_GRAVITY_FRAMES.to_vec(),
            lock_delay_frames: 30,
            das_frames: 10,
            arr_frames: 2,
            scores: ScoreValues::default(),
            lines_per_level: 10,
            preview_count: 5,
        }
    }
}

impl EngineConfig {
    /// Check the parameters describe a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Pieces spawn in a 4-wide box at width / 2 - 2
        if self.board_width < 4 || self.board_height < 4 {
            return Err(ConfigError::Invalid(format!(
                "board must be at least 4x4, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        if self.gravity_frames.is_empty() {
            return Err(ConfigError::Invalid("gravity_frames is empty".into()));
        }
        if self.gravity_frames.contains(&0) {
            return Err(ConfigError::Invalid(
                "gravity_frames entries must be at least 1".into(),
            ));
        }
        if self.lock_delay_frames == 0 {
            return Err(ConfigError::Invalid("lock_delay_frames must be at least 1".into()));
        }
        if self.arr_frames == 0 {
            return Err(ConfigError::Invalid("arr_frames must be at least 1".into()));
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::Invalid("lines_per_level must be at least 1".into()));
        }
        Ok(())
    }

    /// Gravity period for `level` (1-based), clamped to the table
    pub fn gravity_for_level(&self, level: u32) -> u32 {
        let index = (level.max(1) as usize).min(self.gravity_frames.len()) - 1;
        self.gravity_frames[index]
    }
}

/// Errors from loading, saving or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Serialize(e) => write!(f, "failed to serialize config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err)
    }
}
