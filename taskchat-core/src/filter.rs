//! Filter engine: structural include-filter over the full task set.
//!
//! Fields combine conjunctively; values inside one field combine
//! disjunctively. An empty field imposes no constraint, so the default filter
//! includes everything. A task lacking the queried property fails that
//! predicate instead of matching as a wildcard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date_range::{DateInterval, DateRange};
use crate::task::{normalize_tag, StatusCategory, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskFilter {
    /// Folder prefixes (segment-aware).
    pub folders: Vec<String>,
    /// Note-level tags.
    pub note_tags: Vec<String>,
    /// Task-level tags.
    pub task_tags: Vec<String>,
    /// Tags matched against either task-level or note-level tags.
    pub tags: Vec<String>,
    /// Explicit note paths.
    pub notes: Vec<String>,
    /// Priority codes `"1"`..`"4"`, or `"none"` for unprioritized tasks.
    pub priorities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_range: Option<DateRange>,
    /// Status category codes (`open`, `inProgress`, ...) or raw status symbols.
    pub task_statuses: Vec<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
            && self.note_tags.is_empty()
            && self.task_tags.is_empty()
            && self.tags.is_empty()
            && self.notes.is_empty()
            && self.priorities.is_empty()
            && self.due_date_range.is_none()
            && self.task_statuses.is_empty()
    }

    /// Whether the status constraint names `category` by its code.
    pub fn targets_status(&self, category: StatusCategory) -> bool {
        self.task_statuses
            .iter()
            .any(|s| StatusCategory::from_code(s) == Some(category))
    }

    /// Normalize values once for repeated matching.
    pub fn compile(&self, today: NaiveDate) -> CompiledFilter {
        let due = self.due_date_range.as_ref().map(|r| {
            let interval = r.normalize(today);
            if interval.is_none() {
                debug!(range = ?r, "unparseable due date range matches nothing");
            }
            interval
        });

        CompiledFilter {
            folders: self
                .folders
                .iter()
                .map(|f| normalize_folder(f))
                .collect(),
            note_tags: self.note_tags.iter().map(|t| normalize_tag(t)).collect(),
            task_tags: self.task_tags.iter().map(|t| normalize_tag(t)).collect(),
            tags: self.tags.iter().map(|t| normalize_tag(t)).collect(),
            notes: self.notes.iter().map(|n| normalize_note(n)).collect(),
            priorities: self
                .priorities
                .iter()
                .filter_map(|p| priority_code(p))
                .collect(),
            any_priority: !self.priorities.is_empty(),
            due,
            statuses: self.task_statuses.clone(),
        }
    }

    /// Whether `task` passes the filter.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        self.compile(today).matches(task)
    }
}

/// Filter with normalized values.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    folders: Vec<String>,
    note_tags: Vec<String>,
    task_tags: Vec<String>,
    tags: Vec<String>,
    notes: Vec<String>,
    priorities: Vec<u8>,
    any_priority: bool,
    /// `Some(None)`: a range was given but could not be resolved.
    due: Option<Option<DateInterval>>,
    statuses: Vec<String>,
}

impl CompiledFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.match_folder(task)
            && self.match_notes(task)
            && tags_match(&self.task_tags, &task.tags)
            && tags_match(&self.note_tags, &task.note_tags)
            && (self.tags.is_empty()
                || tags_match(&self.tags, &task.tags)
                || tags_match(&self.tags, &task.note_tags))
            && self.match_priority(task)
            && self.match_due(task)
            && self.match_status(task)
    }

    fn match_folder(&self, task: &Task) -> bool {
        if self.folders.is_empty() {
            return true;
        }
        let Some(folder) = task.folder_path() else {
            return false;
        };
        let folder = normalize_folder(folder);
        self.folders.iter().any(|f| {
            f.is_empty() || folder == *f || folder.starts_with(&format!("{f}/"))
        })
    }

    fn match_notes(&self, task: &Task) -> bool {
        if self.notes.is_empty() {
            return true;
        }
        let path = normalize_note(&task.source_path);
        self.notes.iter().any(|n| *n == path)
    }

    fn match_priority(&self, task: &Task) -> bool {
        !self.any_priority || self.priorities.contains(&task.priority)
    }

    fn match_due(&self, task: &Task) -> bool {
        match &self.due {
            None => true,
            Some(None) => false,
            Some(Some(interval)) => task.due_date.is_some_and(|d| interval.contains(d)),
        }
    }

    fn match_status(&self, task: &Task) -> bool {
        if self.statuses.is_empty() {
            return true;
        }
        self.statuses.iter().any(|s| match StatusCategory::from_code(s) {
            Some(c) => c == task.status_category,
            None => *s == task.status,
        })
    }
}

fn tags_match(wanted: &[String], have: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    have.iter().map(|t| normalize_tag(t)).any(|h| {
        wanted
            .iter()
            .any(|w| h == *w || h.starts_with(&format!("{w}/")))
    })
}

fn normalize_folder(f: &str) -> String {
    f.trim().trim_matches('/').to_lowercase()
}

fn normalize_note(n: &str) -> String {
    let n = n.trim().trim_start_matches('/').to_lowercase();
    n.strip_suffix(".md").map(str::to_string).unwrap_or(n)
}

fn priority_code(code: &str) -> Option<u8> {
    let c = code.trim().to_lowercase();
    let level = match c.as_str() {
        "none" | "0" => Some(0),
        _ => c.parse::<u8>().ok().filter(|p| (1..=4).contains(p)),
    };
    if level.is_none() {
        debug!(code, "priority filter code matches nothing");
    }
    level
}

/// Apply `filter` to `tasks`, preserving input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter, today: NaiveDate) -> Vec<&'a Task> {
    if filter.is_empty() {
        return tasks.iter().collect();
    }
    let compiled = filter.compile(today);
    tasks.iter().filter(|t| compiled.matches(t)).collect()
}
