//! Error types

use std::path::PathBuf;

/// Errors raised by the board for malformed input
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum BoardError {
    #[error("board dimensions must be non-zero, got {height} rows x {width} columns")]
    EmptyGrid { height: usize, width: usize },
    #[error("tile matrix to lock has no cells")]
    EmptyShape,
    #[error("tile matrix row {row} has {found} columns, expected {expected}")]
    InvalidShape {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while loading, validating or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}
