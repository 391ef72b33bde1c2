use crate::error::{CoreError, Result};
use crate::lrc::{LrcHeader, DEFAULT_ALBUM, DEFAULT_ARTIST, DEFAULT_TITLE};
use crate::render::{Orientation, DEFAULT_LAST_LINE_HOLD_SECS, DEFAULT_TAIL_BUFFER_SECS};
use crate::store::DEFAULT_NUDGE_SECS;
use crate::time::DEFAULT_FPS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Step used to push a new line's timestamp past its predecessor
    #[serde(default = "default_nudge_secs")]
    pub nudge_secs: f64,
}

const fn default_nudge_secs() -> f64 {
    DEFAULT_NUDGE_SECS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            nudge_secs: default_nudge_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_last_line_hold")]
    pub last_line_hold_secs: u32,
    #[serde(default = "default_tail_buffer")]
    pub tail_buffer_secs: u32,
    #[serde(default)]
    pub orientation: Orientation,
}

const fn default_fps() -> u32 {
    DEFAULT_FPS
}

const fn default_last_line_hold() -> u32 {
    DEFAULT_LAST_LINE_HOLD_SECS
}

const fn default_tail_buffer() -> u32 {
    DEFAULT_TAIL_BUFFER_SECS
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            last_line_hold_secs: default_last_line_hold(),
            tail_buffer_secs: default_tail_buffer(),
            orientation: Orientation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_artist")]
    pub default_artist: String,
    #[serde(default = "default_album")]
    pub default_album: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_artist() -> String {
    DEFAULT_ARTIST.to_string()
}

fn default_album() -> String {
    DEFAULT_ALBUM.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            default_artist: default_artist(),
            default_album: default_album(),
        }
    }
}

impl ExportConfig {
    /// Header values used when audio metadata is missing
    #[must_use]
    pub fn fallback_header(&self) -> LrcHeader {
        LrcHeader {
            title: self.default_title.clone(),
            artist: self.default_artist.clone(),
            album: self.default_album.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_autosave_interval")]
    pub interval_secs: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_autosave_interval() -> u64 {
    30
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_autosave_interval(),
        }
    }
}

impl AutosaveConfig {
    /// Interval between save attempts, at least one second
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to ~/.config/lyricstudio/lyricstudio.log
    #[serde(default)]
    pub enabled: bool,
}

impl StudioConfig {
    /// Get the config file path (~/.config/lyricstudio/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from the default location or create the template on first
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template (the
    /// defaults apply in that case), or an error if the file cannot be read,
    /// parsed or validated.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, CONFIG_TEMPLATE)?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        Self::load_from(&config_path)
    }

    /// Load and validate config from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds
    /// invalid values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.render.fps == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "render.fps must be greater than 0".to_string(),
            });
        }
        if self.editor.nudge_secs.is_nan() || self.editor.nudge_secs <= 0.0 {
            return Err(CoreError::ConfigInvalid {
                message: "editor.nudge_secs must be greater than 0".to_string(),
            });
        }
        if self.remote.base_url.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "remote.base_url must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Commented template written on first run
pub const CONFIG_TEMPLATE: &str = r#"# Lyric Studio Configuration
# ~/.config/lyricstudio/config.toml

[editor]
# Seconds added past the previous line when a new line would not come after it
nudge_secs = 0.5

[render]
fps = 30
# How long the final line stays on screen
last_line_hold_secs = 5
# Extra time appended after the audio ends
tail_buffer_secs = 1
# "landscape" (1280x720) or "vertical" (720x1280)
orientation = "landscape"

[export]
# Header values used when the audio has no metadata
default_title = "Untitled Song"
default_artist = "Unknown Artist"
default_album = "Unknown Album"

[autosave]
enabled = true
interval_secs = 30

[remote]
# Project backend
base_url = "http://127.0.0.1:8787"
timeout_secs = 10
max_retries = 3

[logging]
# Also write logs to ~/.config/lyricstudio/lyricstudio.log
enabled = false
"#;
