pub mod autosave;
pub mod config;
pub mod error;
pub mod line;
pub mod lrc;
pub mod paths;
pub mod playback;
pub mod project;
pub mod render;
pub mod session;
pub mod store;
pub mod studio;
pub mod time;
pub mod tracker;

pub use autosave::{AutoSaver, SaveOutcome};
pub use config::{
    AutosaveConfig, EditorConfig, ExportConfig, LoggingConfig, RemoteConfig, RenderConfig,
    StudioConfig, CONFIG_TEMPLATE,
};

pub use error::{CoreError, PlaybackError, Result};
pub use line::{LineId, LinePatch, LyricLine};
pub use lrc::{export_lrc, format_lrc_timestamp, parse_lrc, write_lrc, LrcExport, LrcHeader, LrcImport};
pub use paths::{
    config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    DEFAULT_SESSION_FILE_NAME, LOG_FILE_NAME,
};
pub use playback::{AudioBackend, AudioMetadata, FrameSeek, PlaybackEvent, PlaybackObserver, PlaybackState};
pub use project::{LyricsDocument, Project, ProjectDraft, ProjectStore};
pub use render::{Orientation, RenderCue, RenderInput, RenderSettings};
pub use session::SessionFile;
pub use store::LyricStore;
pub use studio::{NoticeLevel, Studio, StudioEvent};
pub use time::SecondsExt;
pub use tracker::{active_line_at, ActiveLineChange, PlaybackTracker, SeekTarget};
