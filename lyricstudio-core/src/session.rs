//! Session file persistence for carrying a studio between CLI invocations.

use crate::config::StudioConfig;
use crate::error::Result;
use crate::line::LyricLine;
use crate::playback::AudioMetadata;
use crate::studio::Studio;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Persisted studio state: lines, audio metadata and the linked project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub metadata: AudioMetadata,
    #[serde(default)]
    pub lines: Vec<LyricLine>,
}

impl SessionFile {
    /// Load a session from `path`.
    ///
    /// A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No session file at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let session: Self = serde_json::from_str(&content)?;
        debug!("Loaded {} lines from {}", session.lines.len(), path.display());
        Ok(session)
    }

    /// Save the session to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved session to {}", path.display());
        Ok(())
    }

    /// Capture the persistent parts of `studio`
    #[must_use]
    pub fn from_studio(studio: &Studio) -> Self {
        Self {
            project_id: studio.project_id().map(str::to_string),
            metadata: studio.metadata().clone(),
            lines: studio.lines_snapshot(),
        }
    }

    /// Build a studio configured by `config` holding this session's state
    #[must_use]
    pub fn into_studio(self, config: &StudioConfig) -> Studio {
        let mut studio = Studio::from_config(config);
        studio.set_metadata(self.metadata);
        studio.set_project_id(self.project_id);
        studio.replace_all(self.lines);
        studio
    }
}
