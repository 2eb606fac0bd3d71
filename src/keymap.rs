//! Key bindings and held-key tracking
//!
//! Maps terminal key events onto engine actions. DAS/ARR timing lives in the
//! engine; this module only decides when a key goes down and when it comes
//! back up.

use crate::settings::KeyBindings;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use stackfall::Action;
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// What a key does in the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Game(Action),
    Pause,
    Restart,
    Quit,
}

/// Lookup from key codes to commands
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, Command)>,
}

impl KeyMap {
    pub fn from_bindings(keys: &KeyBindings) -> Self {
        let groups: [(&[String], Command); 10] = [
            (keys.move_left.as_slice(), Command::Game(Action::MoveLeft)),
            (keys.move_right.as_slice(), Command::Game(Action::MoveRight)),
            (keys.soft_drop.as_slice(), Command::Game(Action::SoftDrop)),
            (keys.hard_drop.as_slice(), Command::Game(Action::HardDrop)),
            (keys.rotate_cw.as_slice(), Command::Game(Action::RotateCw)),
            (keys.rotate_ccw.as_slice(), Command::Game(Action::RotateCcw)),
            (keys.hold.as_slice(), Command::Game(Action::Hold)),
            (keys.pause.as_slice(), Command::Pause),
            (keys.restart.as_slice(), Command::Restart),
            (keys.quit.as_slice(), Command::Quit),
        ];

        let mut bindings = Vec::new();
        for (names, command) in groups {
            for name in names {
                match parse_key(name) {
                    Some(code) => bindings.push((code, command)),
                    None => tracing::warn!(key = %name, ?command, "ignoring unknown key binding"),
                }
            }
        }
        Self { bindings }
    }

    /// Command bound to a key event; Ctrl+C always quits
    pub fn command(&self, key: &KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        let code = normalize_key(key.code);
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, command)| command)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_bindings(&KeyBindings::default())
    }
}

/// Parse a key string into KeyCode
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let code = match s.to_lowercase().as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Esc,
        "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
        "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
        "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        KeyCode::Modifier(ModifierKeyCode::RightShift) => {
            KeyCode::Modifier(ModifierKeyCode::LeftShift)
        }
        KeyCode::Modifier(ModifierKeyCode::RightControl) => {
            KeyCode::Modifier(ModifierKeyCode::LeftControl)
        }
        KeyCode::Modifier(ModifierKeyCode::RightAlt) => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        other => other,
    }
}

fn is_repeatable(action: Action) -> bool {
    matches!(
        action,
        Action::MoveLeft | Action::MoveRight | Action::SoftDrop
    )
}

fn opposite(action: Action) -> Option<Action> {
    match action {
        Action::MoveLeft => Some(Action::MoveRight),
        Action::MoveRight => Some(Action::MoveLeft),
        _ => None,
    }
}

/// Turns raw key events into press/release transitions for the engine.
///
/// Terminals with the keyboard enhancement protocol report releases; on the
/// rest a held key shows up as a stream of presses, so a key counts as
/// released once it has been silent for [`KEY_TIMEOUT`].
#[derive(Debug, Clone)]
pub struct HeldKeys {
    held: Vec<(Action, Instant)>,
    timeout: Option<Duration>,
}

impl HeldKeys {
    pub fn new(release_events: bool) -> Self {
        Self {
            held: Vec::new(),
            timeout: if release_events { None } else { Some(KEY_TIMEOUT) },
        }
    }

    /// Feed one key event; returns `(action, pressed)` transitions in order
    pub fn key_event(&mut self, action: Action, kind: KeyEventKind, now: Instant) -> Vec<(Action, bool)> {
        let mut transitions = Vec::new();

        if !is_repeatable(action) {
            if kind == KeyEventKind::Press {
                transitions.push((action, true));
                transitions.push((action, false));
            }
            return transitions;
        }

        match kind {
            KeyEventKind::Release => {
                if self.remove(action) {
                    transitions.push((action, false));
                }
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(entry) = self.held.iter_mut().find(|(held, _)| *held == action) {
                    entry.1 = now;
                    return transitions;
                }
                // Cancel opposite direction
                if let Some(other) = opposite(action) {
                    if self.remove(other) {
                        transitions.push((other, false));
                    }
                }
                self.held.push((action, now));
                transitions.push((action, true));
            }
        }
        transitions
    }

    /// Release keys that have gone quiet; no-op when releases are reported
    pub fn expire(&mut self, now: Instant) -> Vec<Action> {
        let Some(timeout) = self.timeout else {
            return Vec::new();
        };
        let mut expired = Vec::new();
        self.held.retain(|&(action, last_seen)| {
            let alive = now.duration_since(last_seen) <= timeout;
            if !alive {
                expired.push(action);
            }
            alive
        });
        expired
    }

    /// Release everything (pause, restart)
    pub fn clear(&mut self) -> Vec<Action> {
        self.held.drain(..).map(|(action, _)| action).collect()
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.iter().any(|(held, _)| *held == action)
    }

    fn remove(&mut self, action: Action) -> bool {
        let before = self.held.len();
        self.held.retain(|(held, _)| *held != action);
        self.held.len() != before
    }
}
