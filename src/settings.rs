//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/stackfall/settings.toml (or platform
//! equivalent). `STACKFALL_CONFIG` points at a different file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use stackfall::{ConfigError, EngineConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location
pub const CONFIG_ENV: &str = "STACKFALL_CONFIG";

/// Front-end settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine timing, scoring and board parameters
    pub engine: EngineConfig,
    /// Keybindings
    pub keys: KeyBindings,
    /// Best finished game
    pub high_score: HighScore,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [key] = keys {
        serializer.serialize_str(key)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            rotate_cw: vec!["Up".to_string(), "x".to_string()],
            rotate_ccw: vec!["z".to_string()],
            hold: vec!["c".to_string(), "Shift".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

/// The best finished game so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScore {
    pub score: u64,
    pub lines: u32,
    pub level: u32,
}

impl HighScore {
    /// Keep the result if it beats the current best; returns true when it did
    pub fn record(&mut self, score: u64, lines: u32, level: u32) -> bool {
        if score <= self.score {
            return false;
        }
        *self = HighScore {
            score,
            lines,
            level,
        };
        true
    }
}

impl Settings {
    /// Settings file path: the env override, else the platform config dir
    pub fn settings_path() -> Option<PathBuf> {
        resolve_path(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("no config directory, using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not load settings, using defaults");
                Self::default()
            }
        }
    }

    /// Read settings from `path`. An invalid engine section is replaced by defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&contents)?;

        if let Err(e) = settings.engine.validate() {
            tracing::warn!(error = %e, "engine settings rejected, using defaults");
            settings.engine = EngineConfig::default();
        }

        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Write settings to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn resolve_path(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path.or_else(|| {
        ProjectDirs::from("com", "stackfall", "stackfall")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    })
}
