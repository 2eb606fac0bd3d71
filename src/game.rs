//! Core game state and logic
//!
//! [`Game`] owns the board, the bag and every counter. Input arrives through
//! the action methods (or [`Game::handle_input`] for pressed/released keys);
//! time advances through [`Game::tick`], one call per 60 Hz frame.

use crate::bag::Bag;
use crate::board::Board;
use crate::config::{ConfigError, EngineConfig};
use crate::input::{KeyRepeat, RepeatKey};
use crate::piece::Piece;
use crate::score::Score;
use crate::snapshot::{ActivePiece, GameSnapshot};
use crate::srs::try_rotate;
use crate::tetromino::{RotationDirection, TetrominoType};

/// Row of the bounding box's top edge when a piece spawns
const SPAWN_Y: i32 = -1;

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
}

impl Action {
    /// The DAS/ARR slot for actions that repeat while held
    fn repeat_key(&self) -> Option<RepeatKey> {
        match self {
            Action::MoveLeft => Some(RepeatKey::Left),
            Action::MoveRight => Some(RepeatKey::Right),
            Action::SoftDrop => Some(RepeatKey::Down),
            _ => None,
        }
    }
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game {
    config: EngineConfig,
    board: Board,
    bag: Bag,
    /// Current falling piece
    current: Piece,
    x: i32,
    y: i32,
    /// Held piece (can swap once per piece)
    hold_piece: Option<TetrominoType>,
    can_hold: bool,
    score: Score,
    game_over: bool,
    gravity_counter: u32,
    lock_counter: u32,
    /// Set while the piece is grounded and waiting out the lock delay
    is_locking: bool,
    keys: KeyRepeat,
}

impl Game {
    /// Create a new game with an entropy-seeded bag
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_bag(config, Bag::new())
    }

    /// Create a new game whose piece sequence is fixed by `seed`
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_bag(config, Bag::with_seed(seed))
    }

    fn with_bag(config: EngineConfig, mut bag: Bag) -> Result<Self, ConfigError> {
        config.validate()?;
        let first = bag.next();
        let mut game = Self {
            board: Board::new(config.board_width, config.board_height),
            bag,
            current: Piece::new(first),
            x: 0,
            y: SPAWN_Y,
            hold_piece: None,
            can_hold: true,
            score: Score::new(config.scores.clone(), config.lines_per_level),
            game_over: false,
            gravity_counter: 0,
            lock_counter: 0,
            is_locking: false,
            keys: KeyRepeat::new(config.das_frames, config.arr_frames),
            config,
        };
        game.spawn(first);
        Ok(game)
    }

    /// Start a new game: empty board, fresh bag, level 1.
    ///
    /// The random stream carries on, so a seeded game stays reproducible
    /// across resets.
    pub fn reset(&mut self) {
        self.board.reset();
        self.bag.clear();
        self.hold_piece = None;
        self.can_hold = true;
        self.score.reset();
        self.game_over = false;
        self.lock_counter = 0;
        self.is_locking = false;
        self.keys.clear();
        let first = self.bag.next();
        self.spawn(first);
        tracing::debug!(first = ?first, "game reset");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score.points
    }

    pub fn lines(&self) -> u32 {
        self.score.lines
    }

    pub fn level(&self) -> u32 {
        self.score.level
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Advance one frame: held-key repeats, then gravity and lock delay
    pub fn update(&mut self) {
        self.process_held_keys();
        self.tick();
    }

    /// Advance gravity and lock delay by one frame.
    ///
    /// Gravity runs first, so a piece that fails to fall on the same frame
    /// its lock delay runs out locks on this frame.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }

        self.gravity_counter += 1;
        if self.gravity_counter >= self.config.gravity_for_level(self.score.level) {
            self.gravity_counter = 0;
            self.move_down();
        }

        if self.is_locking {
            self.lock_counter += 1;
            if self.lock_counter >= self.config.lock_delay_frames {
                self.lock_piece();
            }
        }
    }

    /// Apply a key press or release.
    ///
    /// Every press acts once immediately; left, right and soft drop keep
    /// repeating through [`Game::process_held_keys`] until released.
    pub fn handle_input(&mut self, action: Action, pressed: bool) {
        let repeat = action.repeat_key();
        if !pressed {
            if let Some(key) = repeat {
                self.keys.release(key);
            }
            return;
        }

        if let Some(key) = repeat {
            self.keys.press(key);
        }
        self.apply(action);
    }

    /// Run one frame of DAS/ARR for held keys
    pub fn process_held_keys(&mut self) {
        if self.game_over {
            return;
        }
        for key in self.keys.update() {
            match key {
                RepeatKey::Left => self.move_left(),
                RepeatKey::Right => self.move_right(),
                RepeatKey::Down => self.soft_drop(),
            };
        }
    }

    /// Perform an action once
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.move_left();
            }
            Action::MoveRight => {
                self.move_right();
            }
            Action::SoftDrop => {
                self.soft_drop();
            }
            Action::HardDrop => {
                self.hard_drop();
            }
            Action::RotateCw => {
                self.rotate(RotationDirection::Clockwise);
            }
            Action::RotateCcw => {
                self.rotate(RotationDirection::CounterClockwise);
            }
            Action::Hold => {
                self.hold();
            }
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, dx: i32) -> bool {
        if self.game_over || !self.fits(self.x + dx, self.y) {
            return false;
        }
        self.x += dx;
        self.reset_lock_delay();
        true
    }

    /// Try to move the piece down one row.
    ///
    /// Failing to move starts the lock delay; only the first failure zeroes
    /// the counter, so repeated failures do not extend it.
    pub fn move_down(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        if self.fits(self.x, self.y + 1) {
            self.y += 1;
            self.is_locking = false;
            self.lock_counter = 0;
            true
        } else {
            if !self.is_locking {
                self.is_locking = true;
                self.lock_counter = 0;
            }
            false
        }
    }

    pub fn soft_drop(&mut self) -> bool {
        if self.move_down() {
            self.score.add_soft_drop(1);
            true
        } else {
            false
        }
    }

    /// Drop to the floor and lock at once; returns the rows fallen
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over {
            return 0;
        }
        let mut distance = 0;
        while self.fits(self.x, self.y + 1) {
            self.y += 1;
            distance += 1;
        }
        self.score.add_hard_drop(distance);
        self.lock_piece();
        distance
    }

    pub fn rotate(&mut self, direction: RotationDirection) -> bool {
        if self.game_over {
            return false;
        }
        match try_rotate(&self.board, &self.current, self.x, self.y, direction) {
            Some(rotated) => {
                self.current.rotation = rotated.rotation;
                self.x = rotated.x;
                self.y = rotated.y;
                self.reset_lock_delay();
                true
            }
            None => false,
        }
    }

    /// Swap the current piece into the hold slot, once per piece
    pub fn hold(&mut self) -> bool {
        if self.game_over || !self.can_hold {
            return false;
        }

        let current = self.current.piece_type;
        let next = match self.hold_piece.replace(current) {
            Some(held) => held,
            None => self.bag.next(),
        };
        tracing::trace!(held = ?current, next = ?next, "hold");

        self.spawn(next);
        self.can_hold = false;
        self.is_locking = false;
        self.lock_counter = 0;
        true
    }

    /// Row the current piece would land on if dropped straight down
    pub fn ghost_y(&self) -> i32 {
        let mut ghost_y = self.y;
        while self.fits(self.x, ghost_y + 1) {
            ghost_y += 1;
        }
        ghost_y
    }

    /// The next `count` pieces the bag will deal
    pub fn upcoming(&mut self, count: usize) -> Vec<TetrominoType> {
        self.bag.peek(count).to_vec()
    }

    /// Read-only state for rendering
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self
                .board
                .rows()
                .map(|row| row.iter().map(|cell| cell.piece_type()).collect())
                .collect(),
            active: ActivePiece {
                piece_type: self.current.piece_type,
                rotation: self.current.rotation,
                shape: *self.current.shape(),
                x: self.x,
                y: self.y,
            },
            ghost_y: self.ghost_y(),
            held: self.hold_piece,
            next: self
                .bag
                .queued()
                .take(self.config.preview_count)
                .collect(),
            score: self.score.points,
            lines: self.score.lines,
            level: self.score.level,
            game_over: self.game_over,
        }
    }

    fn fits(&self, x: i32, y: i32) -> bool {
        self.board
            .is_valid(&self.current, x, y, self.current.rotation)
    }

    /// Grounded pieces get a fresh lock delay after a successful move or rotation
    fn reset_lock_delay(&mut self) {
        if self.is_locking {
            self.lock_counter = 0;
        }
    }

    /// Lock the current piece and spawn next
    fn lock_piece(&mut self) {
        self.board
            .place(&self.current, self.x, self.y, self.current.rotation);

        let lines_cleared = self.board.clear_lines();
        let awarded = self.score.add_clear(lines_cleared);
        tracing::debug!(
            piece = ?self.current.piece_type,
            x = self.x,
            y = self.y,
            lines_cleared,
            awarded,
            score = self.score.points,
            "piece locked"
        );

        self.can_hold = true;
        self.is_locking = false;
        self.lock_counter = 0;

        let next = self.bag.next();
        self.spawn(next);
    }

    /// Put a fresh piece at the spawn position; tops out if it doesn't fit
    fn spawn(&mut self, piece_type: TetrominoType) {
        self.current = Piece::new(piece_type);
        self.x = self.config.board_width as i32 / 2 - 2;
        self.y = SPAWN_Y;
        self.gravity_counter = 0;
        // Keep the preview full so snapshots never come up short
        self.bag.peek(self.config.preview_count);

        if !self.fits(self.x, self.y) {
            self.game_over = true;
            tracing::debug!(piece = %piece_type.symbol(), score = self.score.points, "game over");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::tetromino::Rotation;

    const SEED: u64 = 0x5eed;

    fn new_game() -> Game {
        Game::with_seed(EngineConfig::default(), SEED).unwrap()
    }

    /// Replace the active piece as if `piece_type` had just spawned
    fn force_piece(game: &mut Game, piece_type: TetrominoType) {
        game.spawn(piece_type);
    }

    fn fill_row_except(game: &mut Game, row: i32, gaps: &[i32]) {
        for col in 0..game.board.width() as i32 {
            if !gaps.contains(&col) {
                game.board.set(row, col, Cell::Filled(TetrominoType::Z));
            }
        }
    }

    #[test]
    fn test_new_game_state() {
        let game = new_game();
        let state = game.snapshot();
        assert_eq!((state.score, state.lines, state.level), (0, 0, 1));
        assert!(!state.game_over);
        assert_eq!(state.held, None);
        assert_eq!(state.next.len(), 5);
        assert_eq!((state.active.x, state.active.y), (3, -1));
        assert_eq!(state.active.rotation, Rotation::North);
        assert!(state.board.iter().all(|row| row.iter().all(Option::is_none)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            lock_delay_frames: 0,
            ..EngineConfig::default()
        };
        assert!(Game::with_seed(config, SEED).is_err());
    }

    #[test]
    fn test_seeded_games_match() {
        let a = new_game();
        let b = new_game();
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_hard_drop_i_piece() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::I);
        let expected_next = game.snapshot().next[0];

        // I spawns with its cells on row 0 and falls to row 19
        let distance = game.hard_drop();
        assert_eq!(distance, 19);
        assert_eq!(game.score(), 19 * 2);
        assert_eq!(game.lines(), 0);
        for col in 0..10 {
            let expected = if (3..7).contains(&col) {
                Cell::Filled(TetrominoType::I)
            } else {
                Cell::Empty
            };
            assert_eq!(game.board.get(19, col), Some(expected));
        }
        assert_eq!(game.snapshot().active.piece_type, expected_next);
        assert!(game.can_hold);
    }

    #[test]
    fn test_o_piece_completes_a_line() {
        let mut game = new_game();
        // O covers columns 4 and 5
        fill_row_except(&mut game, 19, &[4, 5]);
        force_piece(&mut game, TetrominoType::O);

        let distance = game.hard_drop();
        assert_eq!(distance, 19);
        assert_eq!(game.lines(), 1);
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 19 * 2 + 100);
        // The O's top half settles onto the floor
        assert_eq!(game.board.get(19, 4), Some(Cell::Filled(TetrominoType::O)));
        assert_eq!(game.board.get(19, 5), Some(Cell::Filled(TetrominoType::O)));
        assert_eq!(game.board.get(19, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_line_clear_recomputes_level() {
        let mut game = new_game();
        game.score.lines = 9;
        fill_row_except(&mut game, 19, &[4, 5]);
        force_piece(&mut game, TetrominoType::O);
        game.hard_drop();
        assert_eq!(game.lines(), 10);
        assert_eq!(game.level(), 2);
        // Scored at the level in effect before the clear
        assert_eq!(game.score(), 19 * 2 + 100);
    }

    #[test]
    fn test_tetris_and_back_to_back() {
        let mut game = new_game();
        for _ in 0..2 {
            for row in 16..20 {
                fill_row_except(&mut game, row, &[0]);
            }
            force_piece(&mut game, TetrominoType::I);
            game.rotate(RotationDirection::Clockwise);
            // Vertical I sits in box column 2; push it to the left wall
            while game.move_left() {}
            assert_eq!(game.x, -2);
            game.hard_drop();
        }
        assert_eq!(game.lines(), 8);
        // 800 + 1200, plus 17 rows of hard drop twice
        assert_eq!(game.score(), 800 + 1200 + 2 * 17 * 2);
    }

    #[test]
    fn test_move_blocked_by_wall() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::O);
        // O occupies box columns 1-2, so x can go down to -1
        let mut moves = 0;
        while game.move_left() {
            moves += 1;
        }
        assert_eq!(moves, 4);
        assert_eq!(game.x, -1);
        assert!(!game.move_left());
    }

    #[test]
    fn test_soft_drop_scores_per_cell() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        assert!(game.soft_drop());
        assert!(game.soft_drop());
        assert_eq!(game.score(), 2);
        assert_eq!(game.y, 1);
    }

    #[test]
    fn test_lock_delay_threshold() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        while game.move_down() {}
        assert!(!game.move_down());
        assert!(game.is_locking);
        let grounded_y = game.y;

        let lock_delay = game.config.lock_delay_frames;
        for _ in 0..lock_delay - 1 {
            game.tick();
            assert_eq!(game.y, grounded_y);
            assert_eq!(game.current.piece_type, TetrominoType::T);
            assert!(game.board.is_empty());
        }
        game.tick();
        assert!(!game.board.is_empty());
        assert!(!game.is_locking);
        assert_eq!(game.y, SPAWN_Y);
    }

    #[test]
    fn test_repeated_descent_failures_do_not_reset_lock_delay() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        while game.move_down() {}
        game.move_down();
        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.lock_counter, 10);
        game.move_down();
        assert_eq!(game.lock_counter, 10);
    }

    #[test]
    fn test_move_resets_lock_delay() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        while game.move_down() {}
        game.move_down();
        for _ in 0..20 {
            game.tick();
        }
        assert!(game.move_left());
        assert_eq!(game.lock_counter, 0);
        assert!(game.is_locking);

        let lock_delay = game.config.lock_delay_frames;
        for _ in 0..lock_delay - 1 {
            game.tick();
        }
        assert!(game.board.is_empty());
        game.tick();
        assert!(!game.board.is_empty());
    }

    #[test]
    fn test_rotate_resets_lock_delay() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        // East in the air, then grounded; South still rests on the floor
        assert!(game.rotate(RotationDirection::Clockwise));
        while game.move_down() {}
        assert!(!game.move_down());
        assert!(game.is_locking);
        let grounded_y = game.y;

        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.lock_counter, 10);

        assert!(game.rotate(RotationDirection::Clockwise));
        assert_eq!(game.current.rotation, Rotation::South);
        assert_eq!(game.y, grounded_y);
        assert_eq!(game.lock_counter, 0);
        assert!(game.is_locking);

        let lock_delay = game.config.lock_delay_frames;
        for _ in 0..lock_delay - 1 {
            game.tick();
        }
        assert!(game.board().is_empty());
        game.tick();
        assert!(!game.board().is_empty());
        assert_eq!(
            game.board().get(grounded_y + 2, 4),
            Some(Cell::Filled(TetrominoType::T))
        );
    }

    #[test]
    fn test_gravity_follows_level_table() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        for _ in 0..47 {
            game.tick();
        }
        assert_eq!(game.y, SPAWN_Y);
        game.tick();
        assert_eq!(game.y, SPAWN_Y + 1);

        game.score.level = 30;
        game.tick();
        assert_eq!(game.y, SPAWN_Y + 2);
    }

    #[test]
    fn test_gravity_failure_then_lock_on_same_tick() {
        let config = EngineConfig {
            gravity_frames: vec![1],
            lock_delay_frames: 1,
            ..EngineConfig::default()
        };
        let mut game = Game::with_seed(config, SEED).unwrap();
        force_piece(&mut game, TetrominoType::T);
        while game.fits(game.x, game.y + 1) {
            game.y += 1;
        }
        // Gravity fails (locking starts) and the 1-frame delay expires in the same tick
        game.tick();
        assert!(!game.board.is_empty());
    }

    #[test]
    fn test_hold_into_empty_slot_draws_from_bag() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        let expected_next = game.snapshot().next[0];
        assert!(game.hold());
        let state = game.snapshot();
        assert_eq!(state.held, Some(TetrominoType::T));
        assert_eq!(state.active.piece_type, expected_next);
        // Only once per piece
        assert!(!game.hold());
    }

    #[test]
    fn test_hold_swap_recenters_piece() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        game.hold();
        game.hard_drop();

        force_piece(&mut game, TetrominoType::L);
        game.move_right();
        game.move_down();
        game.rotate(RotationDirection::Clockwise);
        let queue_before = game.snapshot().next;
        assert!(game.hold());

        assert_eq!(game.current.piece_type, TetrominoType::T);
        assert_eq!(game.current.rotation, Rotation::North);
        assert_eq!((game.x, game.y), (3, SPAWN_Y));
        assert_eq!(game.hold_piece, Some(TetrominoType::L));
        // The bag is untouched by a swap
        assert_eq!(game.snapshot().next, queue_before);
    }

    #[test]
    fn test_hold_clears_lock_state() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        while game.move_down() {}
        game.move_down();
        game.tick();
        assert!(game.is_locking);
        game.hold();
        assert!(!game.is_locking);
        assert_eq!(game.lock_counter, 0);
    }

    #[test]
    fn test_ghost_row() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::I);
        assert_eq!(game.ghost_y(), 18);
        game.board.set(10, 4, Cell::Filled(TetrominoType::S));
        assert_eq!(game.ghost_y(), 8);
        let state = game.snapshot();
        assert_eq!(state.ghost_y, 8);
        assert!(state.ghost_cells().iter().all(|&(row, _)| row == 9));
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut game = new_game();
        fill_row_except(&mut game, 0, &[0]);
        force_piece(&mut game, TetrominoType::T);
        assert!(game.is_game_over());

        let state = game.snapshot();
        assert!(state.game_over);
        let board_before = game.board.clone();
        assert!(!game.move_left());
        assert!(!game.rotate(RotationDirection::Clockwise));
        assert!(!game.hold());
        assert_eq!(game.hard_drop(), 0);
        game.tick();
        game.handle_input(Action::SoftDrop, true);
        game.update();
        assert_eq!(game.board, board_before);
        assert_eq!(game.snapshot(), state);
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut game = new_game();
        fill_row_except(&mut game, 0, &[0]);
        force_piece(&mut game, TetrominoType::S);
        assert!(game.is_game_over());

        game.reset();
        let state = game.snapshot();
        assert!(!state.game_over);
        assert_eq!((state.score, state.lines, state.level), (0, 0, 1));
        assert!(game.board.is_empty());
        assert_eq!(state.held, None);
    }

    #[test]
    fn test_key_press_acts_immediately_then_repeats() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        game.handle_input(Action::MoveRight, true);
        assert_eq!(game.x, 4);

        // DAS 10 + ARR 2: first repeat on frame 12
        for _ in 0..11 {
            game.process_held_keys();
        }
        assert_eq!(game.x, 4);
        game.process_held_keys();
        assert_eq!(game.x, 5);

        game.handle_input(Action::MoveRight, false);
        for _ in 0..20 {
            game.process_held_keys();
        }
        assert_eq!(game.x, 5);
    }

    #[test]
    fn test_burst_of_presses() {
        let mut game = new_game();
        force_piece(&mut game, TetrominoType::T);
        for _ in 0..3 {
            game.handle_input(Action::MoveLeft, true);
            game.handle_input(Action::MoveLeft, false);
        }
        assert_eq!(game.x, 0);
        game.handle_input(Action::RotateCw, true);
        game.handle_input(Action::RotateCw, false);
        assert_eq!(game.current.rotation, Rotation::East);
        assert!(!game.keys.is_held(RepeatKey::Left));
    }

    #[test]
    fn test_upcoming_matches_spawns() {
        let mut game = new_game();
        let upcoming = game.upcoming(10);
        for expected in upcoming {
            game.hard_drop();
            if game.is_game_over() {
                break;
            }
            assert_eq!(game.current.piece_type, expected);
        }
    }

    #[test]
    fn test_snapshot_hides_internal_counters() {
        let game = new_game();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for key in [
            "board", "active", "ghost_y", "held", "next", "score", "lines", "level", "game_over",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {}", key);
        }
        assert_eq!(keys.len(), 9);
    }
}
