//! Checkbox task lines in Markdown notes.
//!
//! Recognized line shapes:
//!   - [ ] Pay rent 📅 2026-03-01 ⏫ #home
//!   * [x] Ship release ✅ 2026-02-10
//!   1. [/] Draft report [due:: 2026-03-05] [priority:: high]
//!
//! Inline fields are stripped from the task text; `#tags` stay in the text
//! and are also collected into `Task::tags`.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use taskchat_core::mapping::{priority_from_emoji, PriorityMapping, StatusMapping};
use taskchat_core::time::parse_iso_date;
use taskchat_core::{SearchConfig, Task};

use crate::types::NoteMeta;

pub struct MarkdownTaskParser {
    priority: PriorityMapping,
    status: StatusMapping,
    line_re: Regex,
    field_re: Regex,
    emoji_date_re: Regex,
    priority_emoji_re: Regex,
    tag_re: Regex,
}

#[derive(Debug, Default)]
struct Fields {
    due: Option<NaiveDate>,
    created: Option<NaiveDate>,
    completed: Option<NaiveDate>,
    priority: u8,
}

impl MarkdownTaskParser {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            priority: config.priority_mapping.clone(),
            status: config.status_mapping.clone(),
            line_re: Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+\[(.?)\]\s+(.*)$")?,
            field_re: Regex::new(r"[\[(]([A-Za-z]+)::\s*([^\])]*?)\s*[\])]")?,
            emoji_date_re: Regex::new(r"(📅|➕|✅|⏳|🛫)\x{FE0F}?\s*(\d{4}-\d{2}-\d{2})")?,
            priority_emoji_re: Regex::new(r"(🔺|⏫|🔼|🔽|⏬)\x{FE0F}?")?,
            tag_re: Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/-]+)")?,
        })
    }

    /// All task lines of a note. Front matter and fenced code blocks are skipped.
    pub fn parse_note(&self, content: &str, meta: &NoteMeta, front_matter_lines: usize) -> Vec<Task> {
        let mut out = Vec::new();
        let mut in_fence = false;

        for (i, line) in content.lines().enumerate().skip(front_matter_lines) {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }
            if let Some(task) = self.parse_line(line, meta, i + 1) {
                out.push(task);
            }
        }
        out
    }

    /// One task from one line, or `None` when the line is not a checkbox item.
    pub fn parse_line(&self, line: &str, meta: &NoteMeta, line_number: usize) -> Option<Task> {
        let caps = self.line_re.captures(line)?;
        let symbol = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str());

        let (text, fields) = self.strip_fields(body);
        if text.is_empty() {
            debug!(path = %meta.path, line = line_number, "skipping empty task line");
            return None;
        }

        let tags: Vec<String> = self
            .tag_re
            .captures_iter(&text)
            .map(|c| c[1].trim_end_matches('/').to_string())
            .filter(|t| !t.is_empty() && !t.chars().all(|c| c.is_ascii_digit()))
            .fold(Vec::new(), |mut acc, t| {
                if !acc.contains(&t) {
                    acc.push(t);
                }
                acc
            });

        let mut task = Task::new(format!("{}:{}", meta.path, line_number), text)
            .with_source(meta.path.clone(), line_number)
            .with_status(symbol, self.status.resolve_symbol(symbol))
            .with_priority(fields.priority)
            .with_tags(tags)
            .with_note_tags(meta.tags.iter().cloned());
        task.original_text = line.to_string();
        task.due_date = fields.due;
        task.created_date = fields.created;
        task.completed_date = fields.completed;
        if let Some(folder) = &meta.folder {
            task = task.with_folder(folder.clone());
        }
        Some(task)
    }

    fn strip_fields(&self, body: &str) -> (String, Fields) {
        let mut fields = Fields::default();

        for caps in self.field_re.captures_iter(body) {
            let value = caps[2].trim();
            match caps[1].to_lowercase().as_str() {
                "due" => fields.due = fields.due.or_else(|| parse_iso_date(value)),
                "created" => fields.created = fields.created.or_else(|| parse_iso_date(value)),
                "completion" | "completed" | "done" => {
                    fields.completed = fields.completed.or_else(|| parse_iso_date(value))
                }
                "priority" | "p" if fields.priority == 0 => {
                    fields.priority = self.priority.resolve(value);
                }
                _ => {}
            }
        }
        for caps in self.emoji_date_re.captures_iter(body) {
            let date = parse_iso_date(&caps[2]);
            match &caps[1] {
                "📅" => fields.due = fields.due.or(date),
                "➕" => fields.created = fields.created.or(date),
                "✅" => fields.completed = fields.completed.or(date),
                _ => {}
            }
        }
        if fields.priority == 0 {
            if let Some(m) = self.priority_emoji_re.captures(body) {
                fields.priority = priority_from_emoji(&m[1]);
            }
        }

        let text = self.field_re.replace_all(body, " ");
        let text = self.emoji_date_re.replace_all(&text, " ");
        let text = self.priority_emoji_re.replace_all(&text, " ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (text, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskchat_core::StatusCategory;

    fn parser() -> MarkdownTaskParser {
        MarkdownTaskParser::new(&SearchConfig::default()).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_emoji_fields() {
        let meta = NoteMeta::new("Home/Chores.md");
        let t = parser()
            .parse_line("- [ ] Pay rent 📅 2026-03-01 ➕ 2026-02-01 ⏫ #home", &meta, 7)
            .unwrap();
        assert_eq!(t.id, "Home/Chores.md:7");
        assert_eq!(t.text, "Pay rent #home");
        assert_eq!(t.due_date, Some(d(2026, 3, 1)));
        assert_eq!(t.created_date, Some(d(2026, 2, 1)));
        assert_eq!(t.priority, 1);
        assert_eq!(t.tags, vec!["home"]);
        assert_eq!(t.folder.as_deref(), Some("Home"));
        assert_eq!(t.status_category, StatusCategory::Open);
    }

    #[test]
    fn test_dataview_fields_resolve_priority_aliases() {
        let mut cfg = SearchConfig::default();
        cfg.priority_mapping.p2 = vec!["2".into(), "urgent".into()];
        cfg.priority_mapping.p1 = vec!["1".into(), "critical".into()];
        let p = MarkdownTaskParser::new(&cfg).unwrap();
        let meta = NoteMeta::new("Plans.md");

        let t = p
            .parse_line("1. [/] Draft report [due:: 2026-03-05] [priority:: urgent]", &meta, 2)
            .unwrap();
        assert_eq!(t.text, "Draft report");
        assert_eq!(t.priority, 2);
        assert_eq!(t.due_date, Some(d(2026, 3, 5)));
        assert_eq!(t.status_category, StatusCategory::InProgress);
        assert_eq!(t.folder, None);
    }

    #[test]
    fn test_status_symbols() {
        let p = parser();
        let meta = NoteMeta::new("a.md");
        let done = p.parse_line("* [x] Ship release ✅ 2026-02-10", &meta, 1).unwrap();
        assert_eq!(done.status_category, StatusCategory::Completed);
        assert_eq!(done.completed_date, Some(d(2026, 2, 10)));

        let dropped = p.parse_line("+ [-] Old idea", &meta, 2).unwrap();
        assert_eq!(dropped.status_category, StatusCategory::Cancelled);

        let odd = p.parse_line("- [?] Ask Sam", &meta, 3).unwrap();
        assert_eq!(odd.status_category, StatusCategory::Other);
        assert_eq!(odd.status, "?");
    }

    #[test]
    fn test_non_tasks_and_malformed_fields() {
        let p = parser();
        let meta = NoteMeta::new("a.md");
        assert!(p.parse_line("- plain bullet", &meta, 1).is_none());
        assert!(p.parse_line("[ ] no marker", &meta, 1).is_none());
        assert!(p.parse_line("- [ ] ", &meta, 1).is_none());

        let t = p.parse_line("- [ ] Fix fence 📅 2026-02-31 #1 #diy", &meta, 4).unwrap();
        assert_eq!(t.due_date, None);
        assert_eq!(t.tags, vec!["diy"]);
    }

    #[test]
    fn test_parse_note_skips_code_fences() {
        let content = "# Notes\n- [ ] real\n```\n- [ ] not a task\n```\n- [x] also real\n";
        let tasks = parser().parse_note(content, &NoteMeta::new("n.md"), 0);
        let lines: Vec<usize> = tasks.iter().map(|t| t.line_number).collect();
        assert_eq!(lines, vec![2, 6]);
    }
}
