use lyricstudio_core::CoreError;
use lyricstudio_remote::RemoteError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No line with id {id}")]
    LineNotFound { id: u32 },

    #[error("Pasted text has no lyrics")]
    EmptyPaste,

    #[error("Auto-save is disabled in the config ([autosave] enabled = false)")]
    AutosaveDisabled,
}

pub type Result<T> = std::result::Result<T, CliError>;
