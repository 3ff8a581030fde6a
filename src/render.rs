//! Incremental, paginated timeline rendering.
//!
//! Years of daily logs cannot be rendered in one pass without freezing
//! the presentation layer, so rendering is chunked behind a resumable
//! cursor. The output is a flat stream of [`RenderItem`]s — entries
//! interleaved with group-break markers at calendar-day boundaries — that
//! a presentation layer consumes; nothing here touches a display.

use std::collections::HashSet;

use crate::date::day_of;
use crate::models::LogEntry;

/// One item of the render stream.
#[derive(Debug, Clone)]
pub enum RenderItem {
    /// The calendar day changed; `0` holds the `YYYY-MM-DD` label.
    GroupBreak(String),
    Entry(LogEntry),
}

/// Where the cursor stands relative to the backing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// No filtered data.
    Empty,
    /// Rendered fewer entries than the sequence holds.
    Partial,
    /// Every entry has been appended to the output.
    Complete,
}

/// Paginated render cursor over a filtered, sorted entry sequence.
///
/// The backing sequence is replaced wholesale by [`reset`] whenever the
/// filtered set changes; the cursor never survives a filter change.
///
/// [`reset`]: TimelineRenderState::reset
pub struct TimelineRenderState {
    page_size: usize,
    entries: Vec<LogEntry>,
    rendered: usize,
    last_group_key: Option<String>,
    emitted_groups: HashSet<String>,
    output: Vec<RenderItem>,
}

impl TimelineRenderState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            entries: Vec::new(),
            rendered: 0,
            last_group_key: None,
            emitted_groups: HashSet::new(),
            output: Vec::new(),
        }
    }

    /// Replace the backing sequence and rewind the cursor.
    pub fn reset(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
        self.rendered = 0;
        self.last_group_key = None;
        self.emitted_groups.clear();
        self.output.clear();
    }

    pub fn phase(&self) -> RenderPhase {
        if self.entries.is_empty() {
            RenderPhase::Empty
        } else if self.rendered < self.entries.len() {
            RenderPhase::Partial
        } else {
            RenderPhase::Complete
        }
    }

    /// Count of entries appended so far (group breaks excluded).
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// The full render stream produced so far.
    pub fn output(&self) -> &[RenderItem] {
        &self.output
    }

    /// Append up to `page_size` further entries, inserting a group break
    /// whenever the calendar day changes. Returns the newly appended
    /// items. A no-op outside [`RenderPhase::Partial`].
    pub fn render_next_chunk(&mut self) -> &[RenderItem] {
        let appended_from = self.output.len();
        if self.phase() != RenderPhase::Partial {
            return &self.output[appended_from..];
        }

        let upto = (self.rendered + self.page_size).min(self.entries.len());
        for idx in self.rendered..upto {
            let entry = self.entries[idx].clone();
            if let Some(key) = group_key(&entry) {
                if self.last_group_key.as_deref() != Some(key.as_str()) {
                    self.output.push(RenderItem::GroupBreak(key.clone()));
                    self.emitted_groups.insert(key.clone());
                    self.last_group_key = Some(key);
                }
            }
            // Entries with no derivable day attach to the group above
            // them rather than opening a break of their own.
            self.output.push(RenderItem::Entry(entry));
        }
        self.rendered = upto;
        &self.output[appended_from..]
    }

    /// Render chunks until the target group has been emitted or the
    /// stream is complete. Returns whether the target was found.
    /// Idempotent: once the target is rendered, further calls change
    /// nothing.
    pub fn ensure_rendered(&mut self, target_group: &str) -> bool {
        loop {
            if self.emitted_groups.contains(target_group) {
                return true;
            }
            if self.phase() != RenderPhase::Partial {
                return false;
            }
            self.render_next_chunk();
        }
    }
}

/// Grouping key: the entry's calendar day as `YYYY-MM-DD`, if derivable.
fn group_key(entry: &LogEntry) -> Option<String> {
    let ts = entry.timestamp.as_deref()?;
    day_of(ts).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: Option<&str>, desc: &str) -> LogEntry {
        serde_json::from_str(&match ts {
            Some(t) => format!(r#"{{"timestamp":"{}","description":"{}"}}"#, t, desc),
            None => format!(r#"{{"description":"{}"}}"#, desc),
        })
        .unwrap()
    }

    fn day_entries(day: &str, n: usize) -> Vec<LogEntry> {
        (0..n)
            .map(|i| entry(Some(&format!("{}T10:{:02}:00", day, i)), &format!("e{}", i)))
            .collect()
    }

    #[test]
    fn reset_to_empty_sequence_is_empty_phase() {
        let mut state = TimelineRenderState::new(10);
        state.reset(Vec::new());
        assert_eq!(state.phase(), RenderPhase::Empty);
        assert!(state.render_next_chunk().is_empty());
        assert_eq!(state.rendered(), 0);
    }

    #[test]
    fn chunks_render_exactly_page_size_until_complete() {
        let mut state = TimelineRenderState::new(4);
        state.reset(day_entries("2024-05-01", 10));
        assert_eq!(state.phase(), RenderPhase::Partial);

        state.render_next_chunk();
        assert_eq!(state.rendered(), 4);
        state.render_next_chunk();
        assert_eq!(state.rendered(), 8);
        assert_eq!(state.phase(), RenderPhase::Partial);
        state.render_next_chunk();
        assert_eq!(state.rendered(), 10);
        assert_eq!(state.phase(), RenderPhase::Complete);

        // Further calls are no-ops.
        state.render_next_chunk();
        assert_eq!(state.rendered(), 10);
    }

    #[test]
    fn group_break_inserted_when_day_changes() {
        let mut entries = day_entries("2024-05-02", 2);
        entries.extend(day_entries("2024-05-01", 2));
        let mut state = TimelineRenderState::new(10);
        state.reset(entries);
        state.render_next_chunk();

        let labels: Vec<String> = state
            .output()
            .iter()
            .map(|item| match item {
                RenderItem::GroupBreak(d) => format!("break:{}", d),
                RenderItem::Entry(e) => format!("entry:{}", e.description),
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                "break:2024-05-02",
                "entry:e0",
                "entry:e1",
                "break:2024-05-01",
                "entry:e0",
                "entry:e1",
            ]
        );
    }

    #[test]
    fn undated_entries_attach_to_previous_group() {
        let mut entries = day_entries("2024-05-01", 1);
        entries.push(entry(None, "undated"));
        let mut state = TimelineRenderState::new(10);
        state.reset(entries);
        state.render_next_chunk();

        let breaks = state
            .output()
            .iter()
            .filter(|i| matches!(i, RenderItem::GroupBreak(_)))
            .count();
        assert_eq!(breaks, 1);
        assert_eq!(state.rendered(), 2);
    }

    #[test]
    fn ensure_rendered_advances_to_target_day() {
        let mut entries = day_entries("2024-05-03", 5);
        entries.extend(day_entries("2024-05-02", 5));
        entries.extend(day_entries("2024-05-01", 5));
        let mut state = TimelineRenderState::new(4);
        state.reset(entries);

        assert!(state.ensure_rendered("2024-05-01"));
        // Enough chunks ran to reach the last day's group break.
        assert!(state.rendered() >= 11);
        assert!(state.rendered() <= 15);
    }

    #[test]
    fn ensure_rendered_is_idempotent() {
        let mut state = TimelineRenderState::new(4);
        state.reset(day_entries("2024-05-01", 9));

        assert!(state.ensure_rendered("2024-05-01"));
        let after_first = state.rendered();
        assert!(state.ensure_rendered("2024-05-01"));
        assert_eq!(state.rendered(), after_first);
    }

    #[test]
    fn ensure_rendered_missing_target_renders_everything() {
        let mut state = TimelineRenderState::new(4);
        state.reset(day_entries("2024-05-01", 6));

        assert!(!state.ensure_rendered("1999-01-01"));
        assert_eq!(state.phase(), RenderPhase::Complete);
        // Calling again after completion stays a no-op.
        assert!(!state.ensure_rendered("1999-01-01"));
        assert_eq!(state.rendered(), 6);
    }
}
