//! stackfall - falling blocks in the terminal

mod keymap;
mod settings;
mod ui;

use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use keymap::{Command, HeldKeys, KeyMap};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use stackfall::{EngineConfig, Game};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use ui::Overlay;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Frames to catch up at most after a stall, so a long pause doesn't fast-forward the game
const MAX_CATCH_UP_FRAMES: u32 = 5;

/// Get the stackfall temp directory, creating it if needed
fn stackfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("stackfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Front-end state wrapped around the engine
struct App {
    game: Game,
    keymap: KeyMap,
    held: HeldKeys,
    settings: Settings,
    /// Where the high score is saved; `None` when no config dir exists
    settings_path: Option<PathBuf>,
    paused: bool,
    /// Set once the finished game has been checked against the high score
    game_over_recorded: Option<bool>,
}

impl App {
    fn new(settings: Settings, settings_path: Option<PathBuf>, release_events: bool) -> Self {
        let game = match Game::new(settings.engine.clone()) {
            Ok(game) => game,
            Err(e) => {
                tracing::warn!(error = %e, "engine settings rejected, using defaults");
                Self::default_game()
            }
        };
        Self {
            game,
            keymap: KeyMap::from_bindings(&settings.keys),
            held: HeldKeys::new(release_events),
            settings,
            settings_path,
            paused: false,
            game_over_recorded: None,
        }
    }

    fn default_game() -> Game {
        match Game::new(EngineConfig::default()) {
            Ok(game) => game,
            Err(e) => unreachable!("default engine config is valid: {}", e),
        }
    }

    fn overlay(&self) -> Overlay {
        match self.game_over_recorded {
            Some(new_best) => Overlay::GameOver { new_best },
            None if self.paused => Overlay::Paused,
            None => Overlay::None,
        }
    }

    /// Handle one key event; returns false when the player quits
    fn key_event(&mut self, key: event::KeyEvent, now: Instant) -> bool {
        let Some(command) = self.keymap.command(&key) else {
            return true;
        };

        match command {
            Command::Quit if key.kind == KeyEventKind::Press => return false,
            Command::Pause if key.kind == KeyEventKind::Press => {
                if !self.game.is_game_over() {
                    self.paused = !self.paused;
                    self.release_all();
                    tracing::debug!(paused = self.paused, "pause toggled");
                }
            }
            Command::Restart if key.kind == KeyEventKind::Press => {
                if self.game.is_game_over() {
                    self.release_all();
                    self.game.reset();
                    self.game_over_recorded = None;
                }
            }
            Command::Game(action) if !self.paused => {
                for (action, pressed) in self.held.key_event(action, key.kind, now) {
                    self.game.handle_input(action, pressed);
                }
            }
            _ => {}
        }
        true
    }

    fn release_all(&mut self) {
        for action in self.held.clear() {
            self.game.handle_input(action, false);
        }
    }

    /// Advance one 60 Hz frame
    fn frame(&mut self, now: Instant) {
        for action in self.held.expire(now) {
            self.game.handle_input(action, false);
        }
        if !self.paused && !self.game.is_game_over() {
            self.game.update();
        }

        // Key actions can end the game between frames too
        if self.game.is_game_over() && self.game_over_recorded.is_none() {
            self.record_game_over();
        }
    }

    fn record_game_over(&mut self) {
        let new_best = self.settings.high_score.record(
            self.game.score(),
            self.game.lines(),
            self.game.level(),
        );
        tracing::info!(
            score = self.game.score(),
            lines = self.game.lines(),
            level = self.game.level(),
            new_best,
            "game over"
        );
        if new_best {
            match &self.settings_path {
                Some(path) => {
                    if let Err(e) = self.settings.save_to(path) {
                        tracing::warn!(error = %e, "could not save high score");
                    }
                }
                None => tracing::warn!("no settings path, high score not saved"),
            }
        }
        self.game_over_recorded = Some(new_best);
    }
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup stackfall temp directory for logs
    let log_dir = stackfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "stackfall=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "stackfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            stdout(),
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        execute!(stdout(), EnterAlternateScreen)?;
    }
    tracing::debug!(release_events, "terminal ready");

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(settings, Settings::settings_path(), release_events);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    if release_events {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if result.is_ok() {
        println!("\nThanks for playing stackfall!");
        println!("Final Score: {}", app.game.score());
        println!("Level: {} | Lines: {}", app.game.level(), app.game.lines());
        println!("Best: {}", app.settings.high_score.score);
    }

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut next_frame = Instant::now();

    loop {
        terminal.draw(|frame| {
            ui::render_game(frame, &app.game.snapshot(), &app.settings.high_score, app.overlay())
        })?;

        // Drain input until the next frame is due
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if !app.key_event(key, Instant::now()) {
                        tracing::info!("quit requested");
                        return Ok(());
                    }
                }
            }
        }

        // Fixed-step update
        let now = Instant::now();
        let mut frames = 0;
        while next_frame <= now && frames < MAX_CATCH_UP_FRAMES {
            app.frame(now);
            next_frame += FRAME_DURATION;
            frames += 1;
        }
        if next_frame <= now {
            next_frame = now + FRAME_DURATION;
        }
    }
}
