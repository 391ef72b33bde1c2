//! Application state for one editing session.
//!
//! [`Studio`] owns the lyric store, the playback state and the active-line
//! tracker, and is the only way to change them. Front ends hold it directly
//! (or behind an `Arc<RwLock<_>>` when background tasks need it) and feed it
//! audio callbacks through [`PlaybackObserver`]. Interested views subscribe
//! to [`StudioEvent`]s for active-line changes and user-facing notices.

use crate::config::StudioConfig;
use crate::error::{CoreError, Result};
use crate::line::{LineId, LinePatch, LyricLine};
use crate::lrc::{export_lrc, parse_lrc, LrcExport, LrcHeader, LEGACY_FILE_NAME};
use crate::playback::{
    AudioBackend, AudioMetadata, FrameSeek, PlaybackEvent, PlaybackObserver, PlaybackState,
};
use crate::render::{Orientation, RenderInput, RenderSettings};
use crate::store::LyricStore;
use crate::tracker::{seek_target, PlaybackTracker};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub const LOG_TARGET: &str = "lyricstudio::studio";

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Events emitted by the studio
#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    /// The line under the playhead changed
    ActiveLineChanged {
        previous: Option<LineId>,
        current: Option<LineId>,
    },
    /// The whole collection was replaced (import, paste, server load)
    LinesReplaced { count: usize },
    /// Message for the user (toast, status bar)
    Notice { level: NoticeLevel, message: String },
}

/// Editing session state
#[derive(Debug)]
pub struct Studio {
    store: LyricStore,
    playback: PlaybackState,
    tracker: PlaybackTracker,
    metadata: AudioMetadata,
    project_id: Option<String>,
    render_settings: RenderSettings,
    orientation: Orientation,
    export_fallback: LrcHeader,
    event_tx: broadcast::Sender<StudioEvent>,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    /// Create a studio with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&StudioConfig::default())
    }

    /// Create a studio using editor, render and export settings from `config`
    #[must_use]
    pub fn from_config(config: &StudioConfig) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            store: LyricStore::with_nudge(config.editor.nudge_secs),
            playback: PlaybackState::default(),
            tracker: PlaybackTracker::new(),
            metadata: AudioMetadata::default(),
            project_id: None,
            render_settings: RenderSettings::from(&config.render),
            orientation: config.render.orientation,
            export_fallback: config.export.fallback_header(),
            event_tx,
        }
    }

    /// Subscribe to studio events
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.event_tx.subscribe()
    }

    #[must_use]
    pub const fn store(&self) -> &LyricStore {
        &self.store
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        self.store.lines()
    }

    #[must_use]
    pub const fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    #[must_use]
    pub const fn metadata(&self) -> &AudioMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: AudioMetadata) {
        if let Some(duration) = metadata.duration {
            self.playback.duration.get_or_insert(duration);
        }
        self.metadata = metadata;
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn set_project_id(&mut self, project_id: Option<String>) {
        self.project_id = project_id;
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// The line under the playhead as of the last playback update
    #[must_use]
    pub const fn active_line(&self) -> Option<LineId> {
        self.tracker.active()
    }

    /// Add a line timed at the current playback position.
    ///
    /// See [`LyricStore::add_line`] for how the timestamp is derived.
    pub fn add_line(&mut self, after: Option<LineId>) -> Option<LineId> {
        let id = self.store.add_line(after, self.playback.position);
        self.sync_active_line();
        id
    }

    pub fn update_line(&mut self, id: LineId, patch: LinePatch) -> bool {
        let updated = self.store.update_line(id, patch);
        self.sync_active_line();
        updated
    }

    pub fn delete_line(&mut self, id: LineId) -> bool {
        let deleted = self.store.delete_line(id);
        self.sync_active_line();
        deleted
    }

    /// Reorder a line; with shared timestamps this can change the active line
    pub fn move_line(&mut self, id: LineId, to_index: usize) -> bool {
        let moved = self.store.move_line(id, to_index);
        self.sync_active_line();
        moved
    }

    /// Pin the line to the current playback position
    pub fn set_current_time_as_timestamp(&mut self, id: LineId) -> bool {
        let updated = self.store.set_timestamp(id, self.playback.position);
        self.sync_active_line();
        updated
    }

    /// Replace the whole collection (server load, file import)
    pub fn replace_all(&mut self, lines: Vec<LyricLine>) {
        let count = lines.len();
        self.store.replace_all(lines);
        self.tracker.reset();
        let _ = self.event_tx.send(StudioEvent::LinesReplaced { count });
        self.sync_active_line();
    }

    /// Replace the collection with the timed lines of an LRC document.
    ///
    /// Header tags fill in audio metadata fields that are not known yet.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LrcNoTimedLines`] when the text holds no timed
    /// line; the collection is left untouched and an error notice is emitted.
    pub fn import_lrc(&mut self, text: &str) -> Result<usize> {
        let import = match parse_lrc(text) {
            Ok(import) => import,
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("Import failed: {e}"));
                return Err(e);
            }
        };

        let count = import.lines.len();
        info!(target: LOG_TARGET, "Imported {count} timed lines from LRC");
        self.metadata.fill_missing_from(&import.metadata);
        self.replace_all(import.lines);
        self.notify(NoticeLevel::Info, format!("Imported {count} lines"));
        Ok(count)
    }

    /// Replace the collection with untimed lines from pasted text.
    ///
    /// Returns the number of lines created; zero leaves the collection
    /// untouched and emits a warning notice.
    pub fn paste_plain_text(&mut self, text: &str) -> usize {
        let count = self.store.replace_with_plain_text(text);
        if count == 0 {
            self.notify(NoticeLevel::Warning, "Pasted text has no lyrics".to_string());
            return 0;
        }

        self.tracker.reset();
        let _ = self.event_tx.send(StudioEvent::LinesReplaced { count });
        self.sync_active_line();
        count
    }

    /// Header for exports: cached audio metadata with configured fallbacks
    #[must_use]
    pub fn export_header(&self) -> LrcHeader {
        LrcHeader::resolve(&self.metadata, &self.export_fallback)
    }

    /// LRC export named `<title> - <artist>.lrc`
    #[must_use]
    pub fn export_lrc(&self) -> LrcExport {
        export_lrc(self.store.lines(), &self.export_header())
    }

    /// LRC export under the fixed legacy name `lyrics.lrc`
    #[must_use]
    pub fn export_lrc_legacy(&self) -> LrcExport {
        LrcExport {
            file_name: LEGACY_FILE_NAME.to_string(),
            ..self.export_lrc()
        }
    }

    /// Check that the lyrics are worth saving or previewing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoValidLines`] (and emits an error notice) when
    /// no line has both text and a timestamp.
    pub fn validate_for_save(&self) -> Result<()> {
        if self.store.has_at_least_one_valid_line() {
            return Ok(());
        }
        self.notify(NoticeLevel::Error, CoreError::NoValidLines.to_string());
        Err(CoreError::NoValidLines)
    }

    /// Whether preview/render is possible
    #[must_use]
    pub fn can_preview(&self) -> bool {
        self.store.has_at_least_one_valid_line()
    }

    /// Whether per-line "jump to timestamp" is offered
    #[must_use]
    pub fn can_jump(&self) -> bool {
        !self.store.is_empty() && self.store.is_strictly_ascending()
    }

    /// Seek the audio (and an optional frame-based preview) to the line's
    /// timestamp and resume playback.
    ///
    /// Returns `false` without touching the players when the line is unknown
    /// or untimed. A refused `play()` is logged and otherwise ignored.
    pub fn jump_to_line(
        &mut self,
        id: LineId,
        audio: &mut dyn AudioBackend,
        preview: Option<&mut dyn FrameSeek>,
    ) -> bool {
        let Some(target) = seek_target(self.store.lines(), id, self.render_settings.fps) else {
            debug!(target: LOG_TARGET, "jump_to_line: line {id} is missing or untimed, ignoring");
            return false;
        };

        audio.seek(target.position);
        self.playback.seek_to(target.position);
        self.sync_active_line();

        if let Err(e) = audio.play() {
            warn!(target: LOG_TARGET, "Could not resume playback after jump: {e}");
        }

        if let Some(preview) = preview {
            preview.seek_to_frame(target.frame);
        }
        true
    }

    /// Record an explicit seek that did not go through [`Self::jump_to_line`]
    pub fn seek(&mut self, audio: &mut dyn AudioBackend, position: f64) {
        audio.seek(position);
        self.playback.seek_to(position);
        self.sync_active_line();
    }

    /// Copy of the lines for saving without holding a borrow on the studio
    #[must_use]
    pub fn lines_snapshot(&self) -> Vec<LyricLine> {
        self.store.lines().to_vec()
    }

    /// Render input for the current lyrics and audio duration
    #[must_use]
    pub fn render_input(&self) -> RenderInput {
        RenderInput::build(
            self.store.lines(),
            self.playback.duration.or(self.metadata.duration),
            &self.render_settings,
            self.orientation,
        )
    }

    fn sync_active_line(&mut self) {
        if let Some(change) = self.tracker.update(self.store.lines(), self.playback.position) {
            let _ = self.event_tx.send(StudioEvent::ActiveLineChanged {
                previous: change.previous,
                current: change.current,
            });
        }
    }

    pub(crate) fn notify(&self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Info => info!(target: LOG_TARGET, "{message}"),
            NoticeLevel::Warning | NoticeLevel::Error => warn!(target: LOG_TARGET, "{message}"),
        }
        let _ = self.event_tx.send(StudioEvent::Notice { level, message });
    }
}

impl PlaybackObserver for Studio {
    fn on_time_update(&mut self, position: f64) {
        self.playback.seek_to(position);
        self.sync_active_line();
    }

    fn on_loaded_metadata(&mut self, duration: f64) {
        self.playback.apply(&PlaybackEvent::LoadedMetadata { duration });
        if self.playback.duration.is_some() {
            self.metadata.duration = self.playback.duration;
        }
    }

    fn on_play(&mut self) {
        self.playback.apply(&PlaybackEvent::Play);
    }

    fn on_pause(&mut self) {
        self.playback.apply(&PlaybackEvent::Pause);
    }

    fn on_volume_change(&mut self, volume: f64, muted: bool) {
        self.playback.apply(&PlaybackEvent::VolumeChange { volume, muted });
    }

    fn on_ended(&mut self) {
        self.playback.apply(&PlaybackEvent::Ended);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;

    #[derive(Default)]
    struct FakeAudio {
        position: f64,
        playing: bool,
        reject_play: bool,
    }

    impl AudioBackend for FakeAudio {
        fn seek(&mut self, position: f64) {
            self.position = position;
        }

        fn play(&mut self) -> std::result::Result<(), PlaybackError> {
            if self.reject_play {
                return Err(PlaybackError::Rejected {
                    reason: "autoplay blocked".into(),
                });
            }
            self.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
        }
    }

    #[derive(Default)]
    struct FakePreview {
        frame: Option<u64>,
    }

    impl FrameSeek for FakePreview {
        fn seek_to_frame(&mut self, frame: u64) {
            self.frame = Some(frame);
        }
    }

    fn studio_with_abc() -> Studio {
        let mut studio = Studio::new();
        studio.replace_all(vec![
            LyricLine::new(LineId(1), "a", Some(10.0)),
            LyricLine::new(LineId(2), "b", Some(20.0)),
            LyricLine::new(LineId(3), "c", Some(30.0)),
        ]);
        studio
    }

    fn drain(rx: &mut broadcast::Receiver<StudioEvent>) -> Vec<StudioEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_time_updates_track_active_line() {
        let mut studio = studio_with_abc();
        let mut rx = studio.subscribe();

        studio.on_event(&PlaybackEvent::TimeUpdate { position: 25.0 });
        assert_eq!(studio.active_line(), Some(LineId(2)));

        // Same tick again: no duplicate event
        studio.on_event(&PlaybackEvent::TimeUpdate { position: 25.0 });

        studio.on_event(&PlaybackEvent::TimeUpdate { position: 5.0 });
        assert_eq!(studio.active_line(), None);

        assert_eq!(
            drain(&mut rx),
            vec![
                StudioEvent::ActiveLineChanged {
                    previous: None,
                    current: Some(LineId(2)),
                },
                StudioEvent::ActiveLineChanged {
                    previous: Some(LineId(2)),
                    current: None,
                },
            ]
        );
    }

    #[test]
    fn test_add_line_uses_playback_position() {
        let mut studio = studio_with_abc();
        studio.on_time_update(35.0);
        let id = studio.add_line(None).unwrap();
        assert_eq!(studio.store().get(id).unwrap().timestamp, Some(35.0));

        studio.on_time_update(15.0);
        let id = studio.add_line(Some(LineId(1))).unwrap();
        assert_eq!(studio.store().index_of(id), Some(1));
        assert_eq!(studio.store().get(id).unwrap().timestamp, Some(15.0));
    }

    #[test]
    fn test_set_current_time_as_timestamp() {
        let mut studio = Studio::new();
        studio.paste_plain_text("one\ntwo");
        studio.on_time_update(4.25);
        let first = studio.lines()[0].id;
        assert!(studio.set_current_time_as_timestamp(first));
        assert_eq!(studio.lines()[0].timestamp, Some(4.25));
        assert_eq!(studio.active_line(), Some(first));
        assert!(!studio.set_current_time_as_timestamp(LineId(99)));
    }

    #[test]
    fn test_import_lrc_replaces_and_adopts_metadata() {
        let mut studio = studio_with_abc();
        let mut rx = studio.subscribe();

        let count = studio
            .import_lrc("[ti:Imported]\n[ar:Singer]\n\n[00:01.00]x\n[00:02.50]y\n")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(studio.lines()[1].timestamp, Some(2.5));
        assert_eq!(studio.export_header().title, "Imported");

        let events = drain(&mut rx);
        assert!(events.contains(&StudioEvent::LinesReplaced { count: 2 }));
    }

    #[test]
    fn test_import_lrc_failure_keeps_lines_and_notifies() {
        let mut studio = studio_with_abc();
        let mut rx = studio.subscribe();

        let err = studio.import_lrc("no timestamps here").unwrap_err();
        assert!(matches!(err, CoreError::LrcNoTimedLines));
        assert_eq!(studio.lines().len(), 3);

        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [StudioEvent::Notice {
                level: NoticeLevel::Error,
                ..
            }]
        ));
    }

    #[test]
    fn test_import_lrc_keeps_cached_metadata() {
        let mut studio = Studio::new();
        studio.set_metadata(AudioMetadata::new("Cached", "Artist"));
        studio.import_lrc("[ti:From file]\n[00:01.00]x\n").unwrap();
        assert_eq!(studio.export_header().title, "Cached");
    }

    #[test]
    fn test_paste_blank_warns() {
        let mut studio = studio_with_abc();
        let mut rx = studio.subscribe();
        assert_eq!(studio.paste_plain_text("   \n"), 0);
        assert_eq!(studio.lines().len(), 3);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [StudioEvent::Notice {
                level: NoticeLevel::Warning,
                ..
            }]
        ));
    }

    #[test]
    fn test_export_uses_metadata_and_legacy_name() {
        let mut studio = studio_with_abc();
        studio.set_metadata(AudioMetadata::new("Song", "Band").with_album("LP"));

        let export = studio.export_lrc();
        assert_eq!(export.file_name, "Song - Band.lrc");
        assert!(export.content.starts_with("[ti:Song]\n[ar:Band]\n[al:LP]\n\n[00:10.00]a\n"));

        let legacy = studio.export_lrc_legacy();
        assert_eq!(legacy.file_name, "lyrics.lrc");
        assert_eq!(legacy.content, export.content);
    }

    #[test]
    fn test_validate_for_save() {
        let mut studio = Studio::new();
        assert!(matches!(studio.validate_for_save(), Err(CoreError::NoValidLines)));
        assert!(!studio.can_preview());

        studio.paste_plain_text("hello");
        assert!(studio.validate_for_save().is_err());

        studio.on_time_update(1.0);
        let id = studio.lines()[0].id;
        studio.set_current_time_as_timestamp(id);
        assert!(studio.validate_for_save().is_ok());
        assert!(studio.can_preview());
    }

    #[test]
    fn test_jump_to_line_seeks_both_players() {
        let mut studio = studio_with_abc();
        let mut audio = FakeAudio::default();
        let mut preview = FakePreview::default();

        assert!(studio.jump_to_line(LineId(2), &mut audio, Some(&mut preview)));
        assert_eq!(audio.position, 20.0);
        assert!(audio.playing);
        assert_eq!(preview.frame, Some(600));
        assert_eq!(studio.playback().position, 20.0);
        assert_eq!(studio.active_line(), Some(LineId(2)));
    }

    #[test]
    fn test_jump_to_untimed_line_is_noop() {
        let mut studio = Studio::new();
        studio.paste_plain_text("untimed");
        let mut audio = FakeAudio {
            position: 3.0,
            ..Default::default()
        };
        assert!(!studio.jump_to_line(studio.lines()[0].id, &mut audio, None));
        assert_eq!(audio.position, 3.0);
        assert!(!audio.playing);
    }

    #[test]
    fn test_jump_survives_rejected_play() {
        let mut studio = studio_with_abc();
        let mut audio = FakeAudio {
            reject_play: true,
            ..Default::default()
        };
        assert!(studio.jump_to_line(LineId(3), &mut audio, None));
        assert_eq!(audio.position, 30.0);
        assert_eq!(studio.lines().len(), 3);
    }

    #[test]
    fn test_can_jump_requires_ascending() {
        let mut studio = studio_with_abc();
        assert!(studio.can_jump());
        studio.update_line(LineId(3), LinePatch::timestamp(Some(1.0)));
        assert!(!studio.can_jump());
        assert!(!Studio::new().can_jump());
    }

    #[test]
    fn test_render_input_uses_loaded_duration() {
        let mut studio = Studio::new();
        studio.replace_all(vec![
            LyricLine::new(LineId(1), "a", Some(0.0)),
            LyricLine::new(LineId(2), "b", Some(5.0)),
        ]);
        assert_eq!(studio.render_input().duration_in_frames, 300);

        studio.on_loaded_metadata(60.0);
        assert_eq!(studio.render_input().duration_in_frames, 1830);
        assert_eq!(studio.metadata().duration, Some(60.0));
    }

    #[test]
    fn test_playback_callbacks() {
        let mut studio = Studio::new();
        studio.on_play();
        assert!(studio.playback().is_playing);
        studio.on_volume_change(0.4, true);
        assert_eq!(studio.playback().volume, 0.4);
        assert!(studio.playback().muted);
        studio.on_ended();
        assert!(!studio.playback().is_playing);

        studio.on_event(&PlaybackEvent::Play);
        studio.on_pause();
        assert!(!studio.playback().is_playing);
    }

    #[test]
    fn test_move_line_resyncs_shared_timestamp() {
        let mut studio = Studio::new();
        studio.replace_all(vec![
            LyricLine::new(LineId(1), "a", Some(10.0)),
            LyricLine::new(LineId(2), "b", Some(10.0)),
        ]);
        studio.on_time_update(15.0);
        assert_eq!(studio.active_line(), Some(LineId(2)));
        let mut rx = studio.subscribe();

        assert!(studio.move_line(LineId(2), 0));
        assert_eq!(studio.active_line(), Some(LineId(1)));
        assert_eq!(
            drain(&mut rx),
            vec![StudioEvent::ActiveLineChanged {
                previous: Some(LineId(2)),
                current: Some(LineId(1)),
            }]
        );
    }

    #[test]
    fn test_delete_active_line_updates_tracker() {
        let mut studio = studio_with_abc();
        studio.on_time_update(25.0);
        assert!(studio.delete_line(LineId(2)));
        assert_eq!(studio.active_line(), Some(LineId(1)));
        assert!(!studio.delete_line(LineId(2)));
    }
}
