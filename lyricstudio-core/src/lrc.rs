//! LRC export and import.
//!
//! Export writes a `[ti:]`/`[ar:]`/`[al:]` header, a blank line, then one
//! `[MM:SS.CC]text` line per timed lyric in ascending timestamp order.
//!
//! Import accepts only lines of the shape `[MM:SS]text` or
//! `[MM:SS.fraction]text` with exactly two digits for minutes and seconds.
//! Everything else, header tags included, is skipped as a lyric line; the
//! header tags are still reported through [`LrcImport::metadata`].

use crate::error::{CoreError, Result};
use crate::line::{timed_lines, LineId, LyricLine};
use crate::playback::AudioMetadata;
use crate::time::SecondsExt;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

pub const DEFAULT_TITLE: &str = "Untitled Song";
pub const DEFAULT_ARTIST: &str = "Unknown Artist";
pub const DEFAULT_ALBUM: &str = "Unknown Album";

/// File name used by the legacy download path
pub const LEGACY_FILE_NAME: &str = "lyrics.lrc";

// The pattern is a literal; it cannot fail to compile.
#[allow(clippy::unwrap_used)]
static TIMED_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([0-9]{2}):([0-9]{2})(\.[0-9]+)?\](.*)$").unwrap());

/// Resolved header values for an exported file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrcHeader {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl Default for LrcHeader {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            artist: DEFAULT_ARTIST.to_string(),
            album: DEFAULT_ALBUM.to_string(),
        }
    }
}

impl LrcHeader {
    /// Take each field from `metadata`, falling back to `fallback` for
    /// missing or blank values.
    #[must_use]
    pub fn resolve(metadata: &AudioMetadata, fallback: &Self) -> Self {
        fn pick(value: Option<&String>, fallback: &str) -> String {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }

        Self {
            title: pick(metadata.title.as_ref(), &fallback.title),
            artist: pick(metadata.artist.as_ref(), &fallback.artist),
            album: pick(metadata.album.as_ref(), &fallback.album),
        }
    }

    /// Download file name: `<title> - <artist>.lrc`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{} - {}.lrc", self.title, self.artist)
    }
}

/// An exported LRC document ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrcExport {
    pub file_name: String,
    pub content: String,
}

/// Result of a successful import
#[derive(Debug, Clone, Default)]
pub struct LrcImport {
    /// Header tags found in the file, if any
    pub metadata: AudioMetadata,
    /// Timed lines in file order, ids starting at 1
    pub lines: Vec<LyricLine>,
}

/// Format seconds as `MM:SS.CC`.
///
/// Values are rounded to the nearest hundredth; negative values format as
/// zero. Minutes widen past two digits for tracks longer than 99 minutes.
#[must_use]
pub fn format_lrc_timestamp(seconds: f64) -> String {
    let centis = seconds.max(0.0).to_centis();
    let minutes = centis / 6000;
    let secs = (centis / 100) % 60;
    let hundredths = centis % 100;
    format!("{minutes:02}:{secs:02}.{hundredths:02}")
}

/// Serialize lines to LRC text.
///
/// Untimed lines are left out. Timed lines are written in ascending
/// timestamp order regardless of their position in `lines`.
#[must_use]
pub fn write_lrc(lines: &[LyricLine], header: &LrcHeader) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "[ti:{}]", header.title);
    let _ = writeln!(output, "[ar:{}]", header.artist);
    let _ = writeln!(output, "[al:{}]", header.album);
    output.push('\n');

    for line in timed_lines(lines) {
        let timestamp = line.timestamp.unwrap_or_default();
        let _ = writeln!(output, "[{}]{}", format_lrc_timestamp(timestamp), line.text);
    }

    output
}

/// Build the downloadable export for `lines`.
#[must_use]
pub fn export_lrc(lines: &[LyricLine], header: &LrcHeader) -> LrcExport {
    LrcExport {
        file_name: header.file_name(),
        content: write_lrc(lines, header),
    }
}

/// Parse LRC text into lyric lines.
///
/// # Errors
///
/// Returns [`CoreError::LrcNoTimedLines`] when no line matches the timed
/// line pattern.
pub fn parse_lrc(input: &str) -> Result<LrcImport> {
    let mut metadata = AudioMetadata::default();
    let mut lines = Vec::new();

    for raw in input.lines() {
        if let Some((timestamp, text)) = parse_timed_line(raw) {
            let id = LineId(u32::try_from(lines.len()).unwrap_or(u32::MAX).saturating_add(1));
            lines.push(LyricLine::new(id, text, Some(timestamp)));
            continue;
        }

        if let Some((tag, value)) = parse_id_tag(raw.trim()) {
            match tag.to_lowercase().as_str() {
                "ti" => metadata.title = Some(value),
                "ar" => metadata.artist = Some(value),
                "al" => metadata.album = Some(value),
                _ => {} // Ignore unknown tags
            }
        }
    }

    if lines.is_empty() {
        return Err(CoreError::LrcNoTimedLines);
    }

    Ok(LrcImport { metadata, lines })
}

/// Parse a `[MM:SS(.fraction)?]text` line into seconds and text
fn parse_timed_line(line: &str) -> Option<(f64, &str)> {
    let captures = TIMED_LINE_RE.captures(line)?;

    let minutes: u32 = captures.get(1)?.as_str().parse().ok()?;
    let seconds: u32 = captures.get(2)?.as_str().parse().ok()?;
    let fraction = captures
        .get(3)
        .and_then(|m| format!("0{}", m.as_str()).parse::<f64>().ok())
        .unwrap_or(0.0);
    let text = captures.get(4).map_or("", |m| m.as_str());

    Some((f64::from(minutes) * 60.0 + f64::from(seconds) + fraction, text))
}

/// Parse an ID tag like [ti:Title] or [ar:Artist]
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') || !line.ends_with(']') {
        return None;
    }

    let content = &line[1..line.len() - 1];
    let (tag, value) = content.split_once(':')?;

    // A numeric tag part is a timestamp, not an ID tag
    if tag.is_empty() || tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some((tag.trim().to_string(), value.trim().to_string()))
}
