use serde::{Deserialize, Serialize};

/// Identifier of a lyric line, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u32);

impl LineId {
    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of song text, optionally pinned to a playback time.
///
/// `timestamp` is in seconds from the start of the track. `None` means the
/// line has not been timed yet. `Some(0.0)` is a real timestamp (the line
/// starts with the track); only [`LyricStore::are_all_timestamps_zero`]
/// treats unset and zero alike.
///
/// [`LyricStore::are_all_timestamps_zero`]: crate::store::LyricStore::are_all_timestamps_zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub id: LineId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl LyricLine {
    /// Create a line
    pub fn new(id: LineId, text: impl Into<String>, timestamp: Option<f64>) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp,
        }
    }

    /// A line is usable for preview, export and rendering when it has
    /// visible text and a timestamp.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_some() && !self.text.trim().is_empty()
    }
}

/// Partial update for a lyric line.
///
/// `timestamp: Some(None)` clears the timestamp; `timestamp: None` leaves it
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePatch {
    pub text: Option<String>,
    pub timestamp: Option<Option<f64>>,
}

impl LinePatch {
    /// Patch that replaces the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            timestamp: None,
        }
    }

    /// Patch that sets or clears the timestamp
    #[must_use]
    pub const fn timestamp(timestamp: Option<f64>) -> Self {
        Self {
            text: None,
            timestamp: Some(timestamp),
        }
    }

    pub(crate) fn apply(self, line: &mut LyricLine) {
        if let Some(text) = self.text {
            line.text = text;
        }
        if let Some(timestamp) = self.timestamp {
            line.timestamp = timestamp.map(|t| t.max(0.0));
        }
    }
}

/// Lines that carry a timestamp, in ascending timestamp order.
///
/// The sort is stable, so lines sharing a timestamp keep their collection
/// order. Unset timestamps are excluded.
#[must_use]
pub fn timed_lines(lines: &[LyricLine]) -> Vec<&LyricLine> {
    let mut timed: Vec<&LyricLine> = lines.iter().filter(|l| l.timestamp.is_some()).collect();
    timed.sort_by(|a, b| {
        a.timestamp
            .unwrap_or_default()
            .total_cmp(&b.timestamp.unwrap_or_default())
    });
    timed
}
