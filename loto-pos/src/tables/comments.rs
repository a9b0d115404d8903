//! Per-line comment drafts and save status
//!
//! Status lines expire lazily: each carries a deadline and is reported only
//! while `now` is before it. Nothing runs in the background.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long "saved" stays visible
pub const SAVED_VISIBLE: Duration = Duration::from_secs(2);
/// How long "error" stays visible
pub const ERROR_VISIBLE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStatus {
    Saving,
    Saved,
    Error,
}

impl CommentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CommentStatus::Saving => "guardando...",
            CommentStatus::Saved => "guardado",
            CommentStatus::Error => "error al guardar",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StatusEntry {
    status: CommentStatus,
    /// `None` while saving
    until: Option<Instant>,
}

impl StatusEntry {
    fn visible_at(&self, now: Instant) -> bool {
        self.until.is_none_or(|until| now < until)
    }
}

#[derive(Debug, Default)]
pub struct CommentBoard {
    drafts: HashMap<String, String>,
    statuses: HashMap<String, StatusEntry>,
}

impl CommentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text being edited, falling back to the committed comment
    pub fn draft<'a>(&'a self, line_id: &str, committed: &'a str) -> &'a str {
        self.drafts
            .get(line_id)
            .map(String::as_str)
            .unwrap_or(committed)
    }

    pub fn has_draft(&self, line_id: &str) -> bool {
        self.drafts.contains_key(line_id)
    }

    pub fn edit(&mut self, line_id: &str, text: impl Into<String>) {
        self.drafts.insert(line_id.to_string(), text.into());
    }

    pub fn begin_save(&mut self, line_id: &str) {
        self.statuses.insert(
            line_id.to_string(),
            StatusEntry {
                status: CommentStatus::Saving,
                until: None,
            },
        );
    }

    /// Backend acknowledged: the draft became the committed comment
    pub fn save_succeeded(&mut self, line_id: &str, now: Instant) {
        self.drafts.remove(line_id);
        self.statuses.insert(
            line_id.to_string(),
            StatusEntry {
                status: CommentStatus::Saved,
                until: Some(now + SAVED_VISIBLE),
            },
        );
    }

    /// Save rejected: the draft stays editable
    pub fn save_failed(&mut self, line_id: &str, now: Instant) {
        self.statuses.insert(
            line_id.to_string(),
            StatusEntry {
                status: CommentStatus::Error,
                until: Some(now + ERROR_VISIBLE),
            },
        );
    }

    pub fn status_at(&self, line_id: &str, now: Instant) -> Option<CommentStatus> {
        self.statuses
            .get(line_id)
            .filter(|entry| entry.visible_at(now))
            .map(|entry| entry.status)
    }

    pub fn status(&self, line_id: &str) -> Option<CommentStatus> {
        self.status_at(line_id, Instant::now())
    }

    /// Drop expired statuses and state of lines that no longer exist
    pub fn retain_lines<'a>(&mut self, live: impl IntoIterator<Item = &'a str>, now: Instant) {
        let live: Vec<&str> = live.into_iter().collect();
        self.drafts.retain(|id, _| live.contains(&id.as_str()));
        self.statuses
            .retain(|id, entry| live.contains(&id.as_str()) && entry.visible_at(now));
    }
}
