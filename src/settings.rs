//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/tetrs-2048/settings.toml (or platform equivalent)

use crate::board::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use crate::error::SettingsError;
use crate::tetromino::TetrominoType;
use crate::tile::DEFAULT_FOUR_CHANCE;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Number of high scores kept
const MAX_HIGH_SCORES: usize = 10;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board dimensions
    pub grid: GridSettings,
    /// Piece and tile generation
    pub spawn: SpawnSettings,
    /// Log output
    pub logging: LoggingSettings,
    /// Best finished sessions, highest score first
    pub high_scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub height: usize,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Chance (0.0-1.0) that a new tile shows 4 instead of 2
    pub four_chance: f64,
    /// Fixed seed for reproducible sessions, random when unset.
    /// 32 bits so it always fits a TOML integer
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. "tetrs_2048=debug"
    pub filter: String,
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    pub lines: u32,
    pub pieces: u32,
    /// Seed that reproduces the session
    pub seed: Option<u32>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            height: DEFAULT_GRID_HEIGHT,
            width: DEFAULT_GRID_WIDTH,
        }
    }
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            four_chance: DEFAULT_FOUR_CHANCE,
            seed: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "tetrs_2048=debug".to_string(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrs", "tetrs-2048").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the config dir, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Load and validate settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject settings a session cannot start from
    pub fn validate(&self) -> Result<(), SettingsError> {
        let widest = TetrominoType::all()
            .iter()
            .map(TetrominoType::size)
            .max()
            .unwrap_or(0);
        if self.grid.width < widest {
            return Err(SettingsError::Invalid(format!(
                "grid width {} is narrower than the widest piece ({})",
                self.grid.width, widest
            )));
        }
        if self.grid.height == 0 {
            return Err(SettingsError::Invalid("grid height must be non-zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.spawn.four_chance) {
            return Err(SettingsError::Invalid(format!(
                "four_chance {} is outside 0.0-1.0",
                self.spawn.four_chance
            )));
        }
        Ok(())
    }

    /// Record a finished session, keeping the best scores
    pub fn add_high_score(&mut self, entry: ScoreEntry) {
        self.high_scores.push(entry);
        self.high_scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.high_scores.truncate(MAX_HIGH_SCORES);
    }

    /// Get the best score recorded
    pub fn best_score(&self) -> Option<u64> {
        self.high_scores.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tetrs-2048-test-{}-{}", std::process::id(), name))
            .join("settings.toml")
    }

    fn entry(score: u64) -> ScoreEntry {
        ScoreEntry {
            score,
            lines: 0,
            pieces: 0,
            seed: None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grid.height, DEFAULT_GRID_HEIGHT);
        assert_eq!(settings.grid.width, DEFAULT_GRID_WIDTH);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("[grid]\nheight = 8\n").unwrap();
        assert_eq!(settings.grid.height, 8);
        assert_eq!(settings.grid.width, DEFAULT_GRID_WIDTH);
        assert_eq!(settings.spawn, SpawnSettings::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.grid.width = 3;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::default();
        settings.spawn.four_chance = 1.5;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::default();
        settings.grid.height = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("round-trip");
        let mut settings = Settings::default();
        settings.spawn.seed = Some(1234);
        settings.add_high_score(entry(512));

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = temp_path("missing");
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Io { .. })
        ));
    }

    #[test]
    fn test_high_scores_sorted_and_capped() {
        let mut settings = Settings::default();
        for score in 0..15 {
            settings.add_high_score(entry(score * 10));
        }
        assert_eq!(settings.high_scores.len(), MAX_HIGH_SCORES);
        assert_eq!(settings.best_score(), Some(140));
        assert!(settings.high_scores.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
