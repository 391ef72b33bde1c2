//! Frame-indexed cues for the preview player and the video renderer.
//!
//! Only valid lines (text and timestamp) become cues. Each cue lasts until
//! the frame before the next cue starts; the final cue holds for a fixed
//! tail. The composition length covers the audio plus a short buffer.

use crate::config::RenderConfig;
use crate::line::{timed_lines, LyricLine};
use crate::time::{frames_for_secs, SecondsExt, DEFAULT_FPS};
use serde::{Deserialize, Serialize};

/// Seconds the last cue stays on screen
pub const DEFAULT_LAST_LINE_HOLD_SECS: u32 = 5;

/// Seconds appended after the audio ends
pub const DEFAULT_TAIL_BUFFER_SECS: u32 = 1;

/// One lyric line placed on the frame timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCue {
    pub text: String,
    pub start_frame: u64,
    /// Last frame (inclusive) on which the line is shown
    pub end_frame: u64,
}

/// Frame-rate and timing parameters for cue building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub fps: u32,
    pub last_line_hold_frames: u64,
    pub tail_buffer_frames: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            last_line_hold_frames: frames_for_secs(DEFAULT_LAST_LINE_HOLD_SECS, DEFAULT_FPS),
            tail_buffer_frames: frames_for_secs(DEFAULT_TAIL_BUFFER_SECS, DEFAULT_FPS),
        }
    }
}

impl From<&RenderConfig> for RenderSettings {
    fn from(config: &RenderConfig) -> Self {
        let fps = config.fps.max(1);
        Self {
            fps,
            last_line_hold_frames: frames_for_secs(config.last_line_hold_secs, fps),
            tail_buffer_frames: frames_for_secs(config.tail_buffer_secs, fps),
        }
    }
}

/// Output frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// 1280×720
    #[default]
    Landscape,
    /// 720×1280
    Vertical,
}

impl Orientation {
    /// Composition size as (width, height)
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Landscape => (1280, 720),
            Self::Vertical => (720, 1280),
        }
    }
}

/// Everything a renderer needs to draw the lyric composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInput {
    pub cues: Vec<RenderCue>,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub duration_in_frames: u64,
}

impl RenderInput {
    /// Build the composition for `lines` over audio of `audio_duration`
    /// seconds (if known).
    #[must_use]
    pub fn build(
        lines: &[LyricLine],
        audio_duration: Option<f64>,
        settings: &RenderSettings,
        orientation: Orientation,
    ) -> Self {
        let cues = build_cues(lines, settings);
        let duration_in_frames = total_frames(&cues, audio_duration, settings);
        let (width, height) = orientation.dimensions();

        Self {
            cues,
            fps: settings.fps,
            width,
            height,
            duration_in_frames,
        }
    }

    /// True when there is nothing to render
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Cue list for `lines` in ascending timestamp order.
///
/// A cue ends one frame before the next cue starts, but never before its
/// own start frame (lines sharing a frame each get a single frame).
#[must_use]
pub fn build_cues(lines: &[LyricLine], settings: &RenderSettings) -> Vec<RenderCue> {
    let valid: Vec<&LyricLine> = timed_lines(lines)
        .into_iter()
        .filter(|l| l.is_valid())
        .collect();

    let starts: Vec<u64> = valid
        .iter()
        .map(|l| l.timestamp.unwrap_or_default().to_frame(settings.fps))
        .collect();

    valid
        .iter()
        .zip(&starts)
        .enumerate()
        .map(|(i, (line, &start_frame))| {
            let end_frame = starts.get(i + 1).map_or(
                start_frame.saturating_add(settings.last_line_hold_frames),
                |&next| next.saturating_sub(1).max(start_frame),
            );
            RenderCue {
                text: line.text.clone(),
                start_frame,
                end_frame,
            }
        })
        .collect()
}

/// Composition length in frames.
///
/// With a known audio duration this is the later of the last cue's end and
/// the audio's last frame, plus the tail buffer. Without one it is the last
/// cue's end. No cues means zero frames.
#[must_use]
pub fn total_frames(cues: &[RenderCue], audio_duration: Option<f64>, settings: &RenderSettings) -> u64 {
    let Some(last) = cues.last() else {
        return 0;
    };

    match audio_duration {
        Some(duration) => last
            .end_frame
            .max(duration.to_frame(settings.fps))
            .saturating_add(settings.tail_buffer_frames),
        None => last.end_frame,
    }
}
