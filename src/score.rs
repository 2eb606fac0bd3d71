//! Scoring and leveling

use crate::config::ScoreValues;

/// Back-to-back multiplier for a tetris following a tetris, as a fraction
const B2B_NUMERATOR: u64 = 3;
const B2B_DENOMINATOR: u64 = 2;

/// Score, lines and level tracking
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starts at 1 and never decreases
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Whether the last line clear was a tetris
    pub back_to_back: bool,
    values: ScoreValues,
    lines_per_level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(ScoreValues::default(), 10)
    }
}

impl Score {
    pub fn new(values: ScoreValues, lines_per_level: u32) -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
            back_to_back: false,
            values,
            lines_per_level: lines_per_level.max(1),
        }
    }

    /// Start over at level 1 with no points
    pub fn reset(&mut self) {
        self.points = 0;
        self.level = 1;
        self.lines = 0;
        self.back_to_back = false;
    }

    /// Score a lock that cleared `lines` rows and return the points awarded.
    ///
    /// Points use the level in effect before the clear; the level is then
    /// recomputed from the new line total.
    pub fn add_clear(&mut self, lines: usize) -> u64 {
        if lines == 0 {
            self.back_to_back = false;
            return 0;
        }

        self.lines += lines as u32;

        let is_tetris = lines == 4;
        let mut base = self.values.for_lines(lines);
        if is_tetris && self.back_to_back {
            base = base * B2B_NUMERATOR / B2B_DENOMINATOR;
        }
        let awarded = base * self.level as u64;
        self.points += awarded;
        self.back_to_back = is_tetris;

        let new_level = self.lines / self.lines_per_level + 1;
        if new_level > self.level {
            tracing::debug!(from = self.level, to = new_level, "level up");
            self.level = new_level;
        }

        awarded
    }

    /// Add score for soft drop (per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64 * self.values.soft_drop;
    }

    /// Add score for hard drop (per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * self.values.hard_drop;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_values_at_level_one() {
        for (lines, expected) in [(1, 100), (2, 300), (3, 500), (4, 800)] {
            let mut score = Score::default();
            assert_eq!(score.add_clear(lines), expected);
            assert_eq!(score.points, expected);
            assert_eq!(score.lines, lines as u32);
        }
    }

    #[test]
    fn test_back_to_back() {
        let mut score = Score::default();
        // First tetris
        score.add_clear(4);
        assert_eq!(score.points, 800);
        // Second tetris is worth floor(800 * 1.5) at level 1
        assert_eq!(score.add_clear(4), 1200);
        assert_eq!(score.points, 2000);
    }

    #[test]
    fn test_back_to_back_uses_current_level() {
        let mut score = Score::default();
        score.level = 3;
        score.add_clear(4);
        assert_eq!(score.add_clear(4), 1200 * 3);
    }

    #[test]
    fn test_b2b_rounds_down() {
        let values = ScoreValues {
            tetris: 801,
            ..ScoreValues::default()
        };
        let mut score = Score::new(values, 10);
        score.add_clear(4);
        assert_eq!(score.add_clear(4), 1201);
    }

    #[test]
    fn test_zero_lines_resets_back_to_back() {
        let mut score = Score::default();
        score.add_clear(4);
        assert!(score.back_to_back);
        assert_eq!(score.add_clear(0), 0);
        assert!(!score.back_to_back);
        assert_eq!(score.add_clear(4), 800);
    }

    #[test]
    fn test_non_tetris_clear_breaks_back_to_back() {
        let mut score = Score::default();
        score.add_clear(4);
        score.add_clear(1);
        assert!(!score.back_to_back);
        assert_eq!(score.add_clear(4), 800);
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::default();
        for _ in 0..10 {
            score.add_clear(1);
        }
        assert_eq!(score.level, 2);
        assert_eq!(score.lines, 10);
    }

    #[test]
    fn test_points_use_level_before_clear() {
        let mut score = Score::default();
        for _ in 0..9 {
            score.add_clear(1);
        }
        assert_eq!(score.level, 1);
        // This triple takes lines to 12 and level to 2, but is scored at level 1
        assert_eq!(score.add_clear(3), 500);
        assert_eq!(score.level, 2);
    }

    #[test]
    fn test_drop_points() {
        let mut score = Score::default();
        score.add_soft_drop(3);
        score.add_hard_drop(10);
        assert_eq!(score.points, 3 + 20);
    }

    #[test]
    fn test_reset() {
        let mut score = Score::default();
        score.add_clear(4);
        score.reset();
        assert_eq!((score.points, score.level, score.lines), (0, 1, 0));
        assert!(!score.back_to_back);
    }
}
