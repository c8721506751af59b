//! Task model shared by the provider, the filter engine, and the scorer.
//!
//! Records are produced per query by a task provider and never persisted by the
//! core. The only mutable part is the `cached_scores` side-channel.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scoring::CachedScores;

/// Normalized workflow category of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCategory {
    Open,
    InProgress,
    Completed,
    Cancelled,
    Other,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 5] = [
        StatusCategory::Open,
        StatusCategory::InProgress,
        StatusCategory::Completed,
        StatusCategory::Cancelled,
        StatusCategory::Other,
    ];

    /// Stable code used in filters and JSON.
    pub fn code(self) -> &'static str {
        match self {
            StatusCategory::Open => "open",
            StatusCategory::InProgress => "inProgress",
            StatusCategory::Completed => "completed",
            StatusCategory::Cancelled => "cancelled",
            StatusCategory::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let c = code.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(c))
    }
}

/// Core task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub source_path: String,
    /// 1-based line in the source note.
    pub line_number: usize,

    /// Display text with inline metadata stripped.
    pub text: String,
    /// Raw line as found in the note.
    pub original_text: String,

    /// Raw status (checkbox symbol or provider text).
    pub status: String,
    pub status_category: StatusCategory,

    /// 0 = none, 1 = highest, 4 = lowest.
    #[serde(default)]
    pub priority: u8,

    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note_tags: Vec<String>,
    #[serde(default)]
    pub folder: Option<String>,

    #[serde(skip)]
    pub cached_scores: Option<CachedScores>,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            source_path: String::new(),
            line_number: 0,
            original_text: format!("- [ ] {text}"),
            text,
            status: " ".to_string(),
            status_category: StatusCategory::Open,
            priority: 0,
            created_date: None,
            completed_date: None,
            due_date: None,
            tags: Vec::new(),
            note_tags: Vec::new(),
            folder: None,
            cached_scores: None,
        }
    }

    pub fn with_source(mut self, path: impl Into<String>, line_number: usize) -> Self {
        self.source_path = path.into();
        self.line_number = line_number;
        self
    }

    pub fn with_status(mut self, raw: impl Into<String>, category: StatusCategory) -> Self {
        self.status = raw.into();
        self.status_category = category;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = if priority <= 4 { priority } else { 0 };
        self
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_created(mut self, created: NaiveDate) -> Self {
        self.created_date = Some(created);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_note_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.note_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Folder of the task, falling back to the parent directory of its note.
    pub fn folder_path(&self) -> Option<&str> {
        if let Some(f) = self.folder.as_deref() {
            return Some(f);
        }
        self.source_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .filter(|dir| !dir.is_empty())
    }

}

/// Normalize a tag for comparison: no leading `#`, lowercase.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_falls_back_to_note_directory() {
        let t = Task::new("t1", "write report").with_source("Work/Reports/weekly.md", 3);
        assert_eq!(t.folder_path(), Some("Work/Reports"));

        let root = Task::new("t2", "root note").with_source("inbox.md", 1);
        assert_eq!(root.folder_path(), None);

        let explicit = Task::new("t3", "x")
            .with_source("Work/a.md", 1)
            .with_folder("Personal");
        assert_eq!(explicit.folder_path(), Some("Personal"));
    }

    #[test]
    fn status_codes_round_trip() {
        for s in StatusCategory::ALL {
            assert_eq!(StatusCategory::from_code(s.code()), Some(s));
        }
        assert_eq!(StatusCategory::from_code("INPROGRESS"), Some(StatusCategory::InProgress));
        assert_eq!(StatusCategory::from_code("later"), None);
    }

    #[test]
    fn out_of_range_priority_is_none() {
        assert_eq!(Task::new("t", "x").with_priority(7).priority, 0);
        assert_eq!(Task::new("t", "x").with_priority(2).priority, 2);
    }

    #[test]
    fn cached_scores_are_not_serialized() {
        let t = Task::new("t1", "x");
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("cachedScores").is_none());
        assert_eq!(json["statusCategory"], "open");
    }
}
