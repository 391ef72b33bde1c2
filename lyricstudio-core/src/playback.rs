use crate::error::PlaybackError;
use serde::{Deserialize, Serialize};

/// Current playback state of the loaded audio.
///
/// Only playback events ([`PlaybackState::apply`]) and explicit seeks
/// ([`PlaybackState::seek_to`]) change it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Current audio time in seconds
    pub position: f64,
    /// Track length in seconds, once metadata has loaded
    pub duration: Option<f64>,
    /// Whether audio is currently playing
    pub is_playing: bool,
    /// Output volume, 0.0 to 1.0
    pub volume: f64,
    /// Whether output is muted
    pub muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: None,
            is_playing: false,
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlaybackState {
    /// Apply an event reported by the audio backend
    pub fn apply(&mut self, event: &PlaybackEvent) {
        match *event {
            PlaybackEvent::TimeUpdate { position } => self.position = position.max(0.0),
            PlaybackEvent::LoadedMetadata { duration } => {
                self.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
            }
            PlaybackEvent::Play => self.is_playing = true,
            PlaybackEvent::Pause | PlaybackEvent::Ended => self.is_playing = false,
            PlaybackEvent::VolumeChange { volume, muted } => {
                self.volume = volume.clamp(0.0, 1.0);
                self.muted = muted;
            }
        }
    }

    /// Record an explicit seek
    pub fn seek_to(&mut self, position: f64) {
        self.position = position.max(0.0);
    }
}

/// Events raised by an audio element or engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Playback position advanced or jumped
    TimeUpdate { position: f64 },
    /// Track metadata (duration) became available
    LoadedMetadata { duration: f64 },
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Volume or mute state changed
    VolumeChange { volume: f64, muted: bool },
    /// Playback reached the end of the track
    Ended,
}

/// Receiver of playback events.
///
/// Audio engines call these hooks as their callbacks fire. Every hook has a
/// no-op default so observers only implement what they track. Engines that
/// produce [`PlaybackEvent`] values can forward them through
/// [`PlaybackObserver::on_event`].
pub trait PlaybackObserver {
    fn on_time_update(&mut self, position: f64);

    fn on_loaded_metadata(&mut self, _duration: f64) {}

    fn on_play(&mut self) {}

    fn on_pause(&mut self) {}

    fn on_volume_change(&mut self, _volume: f64, _muted: bool) {}

    fn on_ended(&mut self) {}

    /// Dispatch an event to the matching hook
    fn on_event(&mut self, event: &PlaybackEvent) {
        match *event {
            PlaybackEvent::TimeUpdate { position } => self.on_time_update(position),
            PlaybackEvent::LoadedMetadata { duration } => self.on_loaded_metadata(duration),
            PlaybackEvent::Play => self.on_play(),
            PlaybackEvent::Pause => self.on_pause(),
            PlaybackEvent::VolumeChange { volume, muted } => self.on_volume_change(volume, muted),
            PlaybackEvent::Ended => self.on_ended(),
        }
    }
}

/// Controls of an audio engine that the studio drives.
pub trait AudioBackend {
    /// Move the playhead to `position` seconds
    fn seek(&mut self, position: f64);

    /// Start or resume playback
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to play (no source loaded,
    /// autoplay restrictions, device failure).
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback
    fn pause(&mut self);
}

/// A secondary player that follows the audio by frame number (e.g. a
/// video preview).
pub trait FrameSeek {
    fn seek_to_frame(&mut self, frame: u64);
}

/// Descriptive metadata of the loaded audio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Track length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl AudioMetadata {
    /// Create metadata with title and artist
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            artist: Some(artist.into()),
            album: None,
            duration: None,
        }
    }

    /// Set album name
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Fill fields that are unset here from `other`
    pub fn fill_missing_from(&mut self, other: &Self) {
        if self.title.is_none() {
            self.title.clone_from(&other.title);
        }
        if self.artist.is_none() {
            self.artist.clone_from(&other.artist);
        }
        if self.album.is_none() {
            self.album.clone_from(&other.album);
        }
        if self.duration.is_none() {
            self.duration = other.duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_state_default() {
        let state = PlaybackState::default();
        assert!(!state.is_playing);
        assert_eq!(state.position, 0.0);
        assert_eq!(state.duration, None);
        assert_eq!(state.volume, 1.0);
        assert!(!state.muted);
    }

    #[test]
    fn test_apply_events() {
        let mut state = PlaybackState::default();

        state.apply(&PlaybackEvent::LoadedMetadata { duration: 180.0 });
        state.apply(&PlaybackEvent::Play);
        state.apply(&PlaybackEvent::TimeUpdate { position: 12.5 });
        assert_eq!(state.duration, Some(180.0));
        assert!(state.is_playing);
        assert_eq!(state.position, 12.5);

        state.apply(&PlaybackEvent::Pause);
        assert!(!state.is_playing);

        state.apply(&PlaybackEvent::Play);
        state.apply(&PlaybackEvent::Ended);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackEvent::VolumeChange {
            volume: 1.7,
            muted: true,
        });
        assert_eq!(state.volume, 1.0);
        assert!(state.muted);
    }

    #[test]
    fn test_unknown_duration_is_none() {
        let mut state = PlaybackState::default();
        state.apply(&PlaybackEvent::LoadedMetadata {
            duration: f64::INFINITY,
        });
        assert_eq!(state.duration, None);
    }

    #[test]
    fn test_seek_clamps_negative() {
        let mut state = PlaybackState::default();
        state.seek_to(-3.0);
        assert_eq!(state.position, 0.0);
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl PlaybackObserver for Recorder {
        fn on_time_update(&mut self, position: f64) {
            self.events.push(format!("time:{position}"));
        }

        fn on_play(&mut self) {
            self.events.push("play".into());
        }
    }

    #[test]
    fn test_observer_dispatch_uses_defaults() {
        let mut recorder = Recorder::default();
        recorder.on_event(&PlaybackEvent::Play);
        recorder.on_event(&PlaybackEvent::TimeUpdate { position: 2.0 });
        recorder.on_event(&PlaybackEvent::Pause);
        recorder.on_event(&PlaybackEvent::Ended);
        assert_eq!(recorder.events, vec!["play", "time:2"]);
    }

    #[test]
    fn test_metadata_fill_missing() {
        let mut cached = AudioMetadata {
            title: Some("Cached".into()),
            ..Default::default()
        };
        let from_file = AudioMetadata::new("File title", "File artist").with_album("File album");
        cached.fill_missing_from(&from_file);
        assert_eq!(cached.title.as_deref(), Some("Cached"));
        assert_eq!(cached.artist.as_deref(), Some("File artist"));
        assert_eq!(cached.album.as_deref(), Some("File album"));
    }
}
