//! Ordered, in-memory collection of lyric lines.
//!
//! Collection order is display order. Timestamp order is derived on demand
//! (see [`timed_lines`](crate::line::timed_lines)), so the store never
//! reorders lines behind the user's back. Ascending timestamps are expected
//! but not enforced: [`LyricStore::is_strictly_ascending`] reports it and
//! callers gate their affordances on it.
//!
//! Operations on ids that are not in the collection do nothing. Every such
//! miss is logged at debug level under [`LOG_TARGET`] and reported through
//! the return value.

use crate::line::{LineId, LinePatch, LyricLine};
use tracing::debug;

pub const LOG_TARGET: &str = "lyricstudio::store";

/// Step used to push a new timestamp past its predecessor.
pub const DEFAULT_NUDGE_SECS: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct LyricStore {
    lines: Vec<LyricLine>,
    nudge_secs: f64,
}

impl Default for LyricStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LyricStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            nudge_secs: DEFAULT_NUDGE_SECS,
        }
    }

    /// Create a store with a custom nudge step for [`add_line`](Self::add_line)
    #[must_use]
    pub fn with_nudge(nudge_secs: f64) -> Self {
        Self {
            lines: Vec::new(),
            nudge_secs: if nudge_secs > 0.0 {
                nudge_secs
            } else {
                DEFAULT_NUDGE_SECS
            },
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: LineId) -> Option<&LyricLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|l| l.id == id)
    }

    /// Id for the next created line: one past the largest id in use.
    #[must_use]
    pub fn next_id(&self) -> LineId {
        self.lines
            .iter()
            .map(|l| l.id)
            .max()
            .unwrap_or_default()
            .next()
    }

    /// Add an empty line timed at `position`.
    ///
    /// Without `after`, the line is appended. Its timestamp is `position`,
    /// or the last line's timestamp plus the nudge step when `position`
    /// does not exceed it.
    ///
    /// With `after`, the line is inserted directly behind that line and its
    /// timestamp is kept strictly between the two neighbours: first raised
    /// past the predecessor by the nudge step, then pulled back to the
    /// neighbours' midpoint if it reaches the successor.
    ///
    /// Returns the new id, or `None` when `after` names no line.
    pub fn add_line(&mut self, after: Option<LineId>, position: f64) -> Option<LineId> {
        let position = position.max(0.0);
        let id = self.next_id();

        let Some(after) = after else {
            let timestamp = match self.lines.last().and_then(|l| l.timestamp) {
                Some(previous) if position <= previous => previous + self.nudge_secs,
                _ => position,
            };
            self.lines.push(LyricLine::new(id, String::new(), Some(timestamp)));
            debug!(target: LOG_TARGET, "Appended line {id} at {timestamp:.2}s");
            return Some(id);
        };

        let Some(index) = self.index_of(after) else {
            debug!(target: LOG_TARGET, "add_line: no line with id {after}, ignoring");
            return None;
        };

        let previous = self.lines[index].timestamp;
        let next = self.lines.get(index + 1).and_then(|l| l.timestamp);
        let timestamp = timestamp_between(position, previous, next, self.nudge_secs);

        self.lines
            .insert(index + 1, LyricLine::new(id, String::new(), Some(timestamp)));
        debug!(target: LOG_TARGET, "Inserted line {id} after {after} at {timestamp:.2}s");
        Some(id)
    }

    /// Merge `patch` into the line with `id`. Returns whether a line matched.
    pub fn update_line(&mut self, id: LineId, patch: LinePatch) -> bool {
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => {
                patch.apply(line);
                true
            }
            None => {
                debug!(target: LOG_TARGET, "update_line: no line with id {id}, ignoring");
                false
            }
        }
    }

    /// Remove the line with `id`. Returns whether a line matched.
    pub fn delete_line(&mut self, id: LineId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(target: LOG_TARGET, "delete_line: no line with id {id}, ignoring");
            return false;
        };
        self.lines.remove(index);
        true
    }

    /// Pin the line with `id` to `position`.
    pub fn set_timestamp(&mut self, id: LineId, position: f64) -> bool {
        self.update_line(id, LinePatch::timestamp(Some(position)))
    }

    /// Move the line with `id` to `to_index` in display order.
    ///
    /// Indices past the end move the line to the end.
    pub fn move_line(&mut self, id: LineId, to_index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            debug!(target: LOG_TARGET, "move_line: no line with id {id}, ignoring");
            return false;
        };
        let line = self.lines.remove(from);
        let to_index = to_index.min(self.lines.len());
        self.lines.insert(to_index, line);
        true
    }

    /// Replace the whole collection.
    pub fn replace_all(&mut self, lines: Vec<LyricLine>) {
        debug!(target: LOG_TARGET, "Replacing {} lines with {}", self.lines.len(), lines.len());
        self.lines = lines;
    }

    /// Replace the collection with one untimed line per non-blank line of
    /// `text`.
    ///
    /// Lines are trimmed. Ids continue from the current largest id. When
    /// `text` holds no visible line the collection is left untouched.
    /// Returns the number of lines created.
    pub fn replace_with_plain_text(&mut self, text: &str) -> usize {
        let base = self.next_id().0;
        let lines: Vec<LyricLine> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .zip(0_u32..)
            .map(|(l, offset)| LyricLine::new(LineId(base.saturating_add(offset)), l, None))
            .collect();

        if lines.is_empty() {
            debug!(target: LOG_TARGET, "Pasted text has no visible lines, keeping collection");
            return 0;
        }

        let count = lines.len();
        self.replace_all(lines);
        count
    }

    /// True when no line has a non-zero timestamp.
    ///
    /// This predicate treats unset timestamps as zero: a freshly pasted
    /// collection counts as "all zero". It is used to detect lyrics that have
    /// not been timed at all, and is the only place where zero and unset are
    /// conflated.
    #[must_use]
    pub fn are_all_timestamps_zero(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.timestamp.map_or(true, |t| t.abs() < f64::EPSILON))
    }

    /// True when every line is timed and timestamps strictly increase in
    /// display order. Empty and single-line collections qualify.
    #[must_use]
    pub fn is_strictly_ascending(&self) -> bool {
        let mut previous: Option<f64> = None;
        for line in &self.lines {
            let Some(timestamp) = line.timestamp else {
                return false;
            };
            if previous.is_some_and(|p| timestamp <= p) {
                return false;
            }
            previous = Some(timestamp);
        }
        true
    }

    /// True when at least one line has text and a timestamp.
    #[must_use]
    pub fn has_at_least_one_valid_line(&self) -> bool {
        self.lines.iter().any(LyricLine::is_valid)
    }

    /// Lines that have text and a timestamp, in display order.
    pub fn valid_lines(&self) -> impl Iterator<Item = &LyricLine> {
        self.lines.iter().filter(|l| l.is_valid())
    }
}

/// Timestamp for a line inserted between `previous` and `next`.
fn timestamp_between(position: f64, previous: Option<f64>, next: Option<f64>, nudge: f64) -> f64 {
    let mut timestamp = position;
    if let Some(previous) = previous {
        if timestamp <= previous {
            timestamp = previous + nudge;
        }
    }
    if let Some(next) = next {
        if timestamp >= next {
            timestamp = previous.map_or(next / 2.0, |previous| (previous + next) / 2.0);
        }
    }
    timestamp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(lines: &[(&str, Option<f64>)]) -> LyricStore {
        let mut store = LyricStore::new();
        store.replace_all(
            lines
                .iter()
                .zip(1_u32..)
                .map(|((text, ts), id)| LyricLine::new(LineId(id), *text, *ts))
                .collect(),
        );
        store
    }

    #[test]
    fn test_add_line_to_empty_store() {
        let mut store = LyricStore::new();
        let id = store.add_line(None, 3.2).unwrap();
        assert_eq!(id, LineId(1));
        assert_eq!(store.lines()[0].timestamp, Some(3.2));
        assert_eq!(store.lines()[0].text, "");
    }

    #[test]
    fn test_add_line_appends_at_position() {
        let mut store = store_with(&[("a", Some(10.0))]);
        let id = store.add_line(None, 12.0).unwrap();
        assert_eq!(id, LineId(2));
        assert_eq!(store.lines()[1].timestamp, Some(12.0));
    }

    #[test]
    fn test_add_line_append_nudges_past_last() {
        let mut store = store_with(&[("a", Some(10.0))]);
        store.add_line(None, 4.0);
        assert_eq!(store.lines()[1].timestamp, Some(10.5));

        store.add_line(None, 10.5);
        assert_eq!(store.lines()[2].timestamp, Some(11.0));
    }

    #[test]
    fn test_add_line_append_always_exceeds_last() {
        for position in [0.0, 5.0, 9.99, 10.0, 10.01, 50.0] {
            let mut store = store_with(&[("a", Some(1.0)), ("b", Some(10.0))]);
            store.add_line(None, position);
            let last = store.lines().last().unwrap().timestamp.unwrap();
            assert!(last > 10.0, "position {position} gave {last}");
        }
    }

    #[test]
    fn test_add_line_append_after_untimed_uses_position() {
        let mut store = store_with(&[("a", None)]);
        store.add_line(None, 2.0);
        assert_eq!(store.lines()[1].timestamp, Some(2.0));
    }

    #[test]
    fn test_add_line_after_uses_position_when_between() {
        let mut store = store_with(&[("a", Some(10.0)), ("b", Some(20.0))]);
        let id = store.add_line(Some(LineId(1)), 15.0).unwrap();
        assert_eq!(store.index_of(id), Some(1));
        assert_eq!(store.get(id).unwrap().timestamp, Some(15.0));
    }

    #[test]
    fn test_add_line_after_nudges_past_predecessor() {
        let mut store = store_with(&[("a", Some(10.0)), ("b", Some(20.0))]);
        let id = store.add_line(Some(LineId(1)), 2.0).unwrap();
        assert_eq!(store.get(id).unwrap().timestamp, Some(10.5));
    }

    #[test]
    fn test_add_line_after_uses_midpoint_on_collision() {
        let mut store = store_with(&[("a", Some(10.0)), ("b", Some(10.4))]);
        let id = store.add_line(Some(LineId(1)), 2.0).unwrap();
        let ts = store.get(id).unwrap().timestamp.unwrap();
        assert!((ts - 10.2).abs() < 1e-9);

        // No successor: the position stands as long as it is past "b"
        let id = store.add_line(Some(LineId(2)), 25.0).unwrap();
        assert_eq!(store.get(id).unwrap().timestamp, Some(25.0));
    }

    #[test]
    fn test_add_line_after_strictly_between_neighbours() {
        for position in [0.0, 9.0, 10.0, 10.2, 10.5, 11.0, 30.0] {
            let mut store = store_with(&[("a", Some(10.0)), ("b", Some(11.0))]);
            let id = store.add_line(Some(LineId(1)), position).unwrap();
            let ts = store.get(id).unwrap().timestamp.unwrap();
            assert!(ts > 10.0 && ts < 11.0, "position {position} gave {ts}");
        }
    }

    #[test]
    fn test_add_line_after_last_line() {
        let mut store = store_with(&[("a", Some(10.0)), ("b", Some(20.0))]);
        let id = store.add_line(Some(LineId(2)), 3.0).unwrap();
        assert_eq!(store.index_of(id), Some(2));
        assert_eq!(store.get(id).unwrap().timestamp, Some(20.5));
    }

    #[test]
    fn test_add_line_after_unknown_id_is_noop() {
        let mut store = store_with(&[("a", Some(10.0))]);
        assert_eq!(store.add_line(Some(LineId(99)), 3.0), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_line_clamps_negative_position() {
        let mut store = LyricStore::new();
        store.add_line(None, -4.0);
        assert_eq!(store.lines()[0].timestamp, Some(0.0));
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        let mut store = LyricStore::new();
        store.replace_all(vec![
            LyricLine::new(LineId(7), "a", None),
            LyricLine::new(LineId(3), "b", None),
        ]);
        assert_eq!(store.next_id(), LineId(8));
    }

    #[test]
    fn test_custom_nudge() {
        let mut store = LyricStore::with_nudge(0.25);
        store.add_line(None, 5.0);
        store.add_line(None, 1.0);
        assert_eq!(store.lines()[1].timestamp, Some(5.25));
    }

    #[test]
    fn test_update_line_merges_fields() {
        let mut store = store_with(&[("a", Some(1.0))]);
        assert!(store.update_line(LineId(1), LinePatch::text("hello")));
        assert_eq!(store.lines()[0].text, "hello");
        assert_eq!(store.lines()[0].timestamp, Some(1.0));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = store_with(&[("a", Some(1.0))]);
        let before = store.lines().to_vec();
        assert!(!store.update_line(LineId(5), LinePatch::text("x")));
        assert_eq!(store.lines(), before.as_slice());
    }

    #[test]
    fn test_delete_line() {
        let mut store = store_with(&[("a", Some(1.0)), ("b", Some(2.0))]);
        assert!(store.delete_line(LineId(1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.lines()[0].text, "b");
    }

    #[test]
    fn test_delete_unknown_id_leaves_collection_unchanged() {
        let mut store = store_with(&[("a", Some(1.0)), ("b", Some(2.0))]);
        let before = store.lines().to_vec();
        assert!(!store.delete_line(LineId(42)));
        assert_eq!(store.lines(), before.as_slice());
    }

    #[test]
    fn test_set_timestamp() {
        let mut store = store_with(&[("a", None)]);
        assert!(store.set_timestamp(LineId(1), 42.5));
        assert_eq!(store.lines()[0].timestamp, Some(42.5));
    }

    #[test]
    fn test_move_line() {
        let mut store = store_with(&[("a", None), ("b", None), ("c", None)]);
        assert!(store.move_line(LineId(3), 0));
        let texts: Vec<_> = store.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);

        assert!(store.move_line(LineId(3), 100));
        let texts: Vec<_> = store.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);

        assert!(!store.move_line(LineId(9), 0));
    }

    #[test]
    fn test_paste_plain_text() {
        let mut store = LyricStore::new();
        let count = store.replace_with_plain_text("Hello\n\nWorld\n");
        assert_eq!(count, 2);
        assert_eq!(store.lines()[0].text, "Hello");
        assert_eq!(store.lines()[1].text, "World");
        assert!(store.lines().iter().all(|l| l.timestamp.is_none()));
    }

    #[test]
    fn test_paste_replaces_and_trims() {
        let mut store = store_with(&[("old", Some(1.0))]);
        store.replace_with_plain_text("  one  \r\n\t\r\ntwo");
        let texts: Vec<_> = store.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(store.lines()[0].id, LineId(2));
        assert_eq!(store.lines()[1].id, LineId(3));
    }

    #[test]
    fn test_paste_blank_text_keeps_collection() {
        let mut store = store_with(&[("old", Some(1.0))]);
        assert_eq!(store.replace_with_plain_text("\n   \n"), 0);
        assert_eq!(store.lines()[0].text, "old");
    }

    #[test]
    fn test_are_all_timestamps_zero() {
        assert!(LyricStore::new().are_all_timestamps_zero());
        assert!(store_with(&[("a", None), ("b", Some(0.0))]).are_all_timestamps_zero());
        assert!(!store_with(&[("a", Some(0.0)), ("b", Some(0.1))]).are_all_timestamps_zero());
    }

    #[test]
    fn test_is_strictly_ascending() {
        assert!(LyricStore::new().is_strictly_ascending());
        assert!(store_with(&[("a", Some(0.0)), ("b", Some(1.0))]).is_strictly_ascending());
        assert!(!store_with(&[("a", Some(1.0)), ("b", Some(1.0))]).is_strictly_ascending());
        assert!(!store_with(&[("a", Some(2.0)), ("b", Some(1.0))]).is_strictly_ascending());
        assert!(!store_with(&[("a", Some(1.0)), ("b", None)]).is_strictly_ascending());
    }

    #[test]
    fn test_has_at_least_one_valid_line() {
        assert!(!LyricStore::new().has_at_least_one_valid_line());
        assert!(!store_with(&[("a", None), ("", Some(1.0))]).has_at_least_one_valid_line());
        assert!(store_with(&[("a", None), ("b", Some(0.0))]).has_at_least_one_valid_line());
    }
}
