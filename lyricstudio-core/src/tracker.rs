//! Maps playback time to the active lyric line.
//!
//! Each lookup sorts a snapshot of the timed lines and binary-searches it, so
//! nothing depends on time moving forward: a backward seek simply produces a
//! different answer on the next tick. Lines without a timestamp never become
//! active.

use crate::line::{timed_lines, LineId, LyricLine};
use crate::time::SecondsExt;

/// The line with the greatest timestamp at or before `position`.
///
/// Returns `None` when `position` precedes every timestamp or no line is
/// timed. When several lines share a timestamp, the one later in display
/// order wins.
#[must_use]
pub fn active_line_at(lines: &[LyricLine], position: f64) -> Option<LineId> {
    let timed = timed_lines(lines);
    let started = timed.partition_point(|l| l.timestamp.unwrap_or_default() <= position);
    started.checked_sub(1).map(|i| timed[i].id)
}

/// Change of the active line between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLineChange {
    pub previous: Option<LineId>,
    pub current: Option<LineId>,
}

/// Where to move the players when jumping to a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTarget {
    /// Audio position in seconds
    pub position: f64,
    /// Matching frame for a frame-based player
    pub frame: u64,
}

/// Seek target for the line with `id`, or `None` if the line is unknown or
/// untimed.
#[must_use]
pub fn seek_target(lines: &[LyricLine], id: LineId, fps: u32) -> Option<SeekTarget> {
    let position = lines.iter().find(|l| l.id == id)?.timestamp?;
    Some(SeekTarget {
        position,
        frame: position.to_frame(fps),
    })
}

/// Remembers the active line across time-update ticks.
#[derive(Debug, Clone, Default)]
pub struct PlaybackTracker {
    active: Option<LineId>,
}

impl PlaybackTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// The line that was active at the last update
    #[must_use]
    pub const fn active(&self) -> Option<LineId> {
        self.active
    }

    /// Recompute the active line for `position`.
    ///
    /// Returns the change when the active line differs from the previous
    /// tick, `None` otherwise. Calling this repeatedly with the same inputs
    /// reports at most one change.
    pub fn update(&mut self, lines: &[LyricLine], position: f64) -> Option<ActiveLineChange> {
        let current = active_line_at(lines, position);
        if current == self.active {
            return None;
        }

        let change = ActiveLineChange {
            previous: self.active,
            current,
        };
        self.active = current;
        Some(change)
    }

    /// Forget the active line (e.g. after the lyrics were replaced)
    pub fn reset(&mut self) {
        self.active = None;
    }
}
