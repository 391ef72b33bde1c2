//! Seconds-to-frame and seconds-to-centisecond conversions.
//!
//! Playback positions and lyric timestamps are `f64` seconds. Renderers work
//! in whole frames and LRC files in hundredths of a second; these helpers do
//! the conversion with explicit saturation so negative or non-finite inputs
//! never wrap.

/// Frame rate used for previews and rendered videos.
pub const DEFAULT_FPS: u32 = 30;

/// Extension trait for converting second values.
pub trait SecondsExt {
    /// Frame index containing this instant: `floor(seconds * fps)`.
    ///
    /// Negative and NaN values map to frame 0; values beyond `u64::MAX`
    /// frames saturate.
    fn to_frame(self, fps: u32) -> u64;

    /// Total hundredths of a second, rounded to the nearest centisecond.
    ///
    /// Rounding (rather than truncating) keeps values like `0.29`, which is
    /// stored as `0.28999...`, at 29 centiseconds.
    fn to_centis(self) -> u64;
}

impl SecondsExt for f64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_frame(self, fps: u32) -> u64 {
        // Float-to-int `as` casts saturate and map NaN to 0.
        (self * f64::from(fps)).floor() as u64
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_centis(self) -> u64 {
        (self * 100.0).round() as u64
    }
}

/// Number of frames spanning `secs` whole seconds.
#[must_use]
pub fn frames_for_secs(secs: u32, fps: u32) -> u64 {
    u64::from(secs) * u64::from(fps)
}
