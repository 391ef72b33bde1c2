use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created with default settings.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Lyrics validation errors
    #[error("No timestamped lines found in LRC input")]
    LrcNoTimedLines,

    #[error("Nothing to save: at least one line needs text and a timestamp")]
    NoValidLines,

    // Persistence errors
    #[error("Project backend request failed: {reason}")]
    Backend { reason: String },

    #[error("Project {id} not found")]
    ProjectNotFound { id: String },

    #[error("No project is associated with this session")]
    NoProject,

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Failure reported by an audio backend when starting playback.
///
/// These never affect lyric state; callers log them and carry on.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Playback was rejected: {reason}")]
    Rejected { reason: String },
}
