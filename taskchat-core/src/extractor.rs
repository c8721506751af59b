//! Pattern-based intent extractor.
//!
//! Extraction is greedy and runs in a fixed order: tags, folder, priority,
//! due-date range, relative due date, status, then keywords. Each step blanks
//! the text it consumed, so later steps never re-read a span. Malformed input
//! never fails; the worst case is an intent with no keywords and no
//! properties, flagged vague.

use regex::{Captures, Regex};
use std::ops::Range;
use tracing::debug;

use crate::config::SearchConfig;
use crate::date_range::{is_due_filter_token, DateOperator, DateRange};
use crate::error::Result;
use crate::intent::{DueDateIntent, OneOrMany, QueryIntent};
use crate::mapping::{PriorityMapping, StatusMapping};
use crate::stop_words::StopWords;
use crate::task::StatusCategory;
use crate::time::{parse_iso_date, parse_offset_days};

/// Date expression accepted inside range phrases.
const DATE_EXPR: &str = r"\d{4}-\d{1,2}-\d{1,2}|today|tomorrow|yesterday|[+-]\d+[dw]";
/// Separators inside multi-value lists.
const LIST_SEP: &str = r"\s*(?:,|/|\bor\b|\band\b)\s*";

pub struct IntentExtractor {
    priority: PriorityMapping,
    status: StatusMapping,
    stop_words: StopWords,

    tag_re: Regex,
    folder_res: Vec<Regex>,
    priority_list_re: Regex,
    priority_word_re: Option<Regex>,
    range_between_re: Regex,
    range_from_re: Regex,
    range_single_re: Regex,
    due_token_re: Regex,
    status_list_re: Regex,
    status_word_re: Option<Regex>,
    list_sep_re: Regex,
}

/// `a|b|c` of escaped aliases, longest first. `None` when empty.
fn alternation<'a>(aliases: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut v: Vec<&str> = aliases.into_iter().filter(|a| !a.is_empty()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| b.len().cmp(&a.len()));
    v.dedup();
    Some(
        v.into_iter()
            .map(|a| regex::escape(a).replace(r"\ ", r"\s+").replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Relative expressions always resolve; ISO dates must be real calendar days.
fn is_date_expr(expr: &str) -> bool {
    match expr.chars().next() {
        Some(c) if c.is_ascii_digit() => parse_iso_date(expr).is_some(),
        Some('+' | '-') => parse_offset_days(expr).is_some(),
        _ => true,
    }
}

fn blank(work: &mut String, spans: &[Range<usize>]) {
    for r in spans {
        let len = r.end - r.start;
        work.replace_range(r.clone(), &" ".repeat(len));
    }
}

impl IntentExtractor {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let priority = config.priority_mapping.clone();
        let status = config.status_mapping.clone();

        let priority_table = priority.alias_table();
        let priority_value = {
            let words = alternation(priority_table.iter().map(|(a, _)| a.as_str()));
            match words {
                Some(w) => format!(r"(?:[1-4]|p[1-4]|{w})"),
                None => r"(?:[1-4]|p[1-4])".to_string(),
            }
        };
        let priority_words = alternation(
            priority_table
                .iter()
                .map(|(a, _)| a.as_str())
                .filter(|a| !a.chars().all(|c| c.is_ascii_digit())),
        );

        let status_table = status.alias_table();
        let codes: Vec<String> = StatusCategory::ALL
            .iter()
            .map(|c| c.code().to_lowercase())
            .collect();
        let status_value = alternation(
            status_table
                .iter()
                .map(|(a, _)| a.as_str())
                .chain(codes.iter().map(String::as_str)),
        )
        .unwrap_or_else(|| "open".to_string());
        let status_words = alternation(status_table.iter().map(|(a, _)| a.as_str()));

        Ok(Self {
            tag_re: Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/-]+)")?,
            folder_res: vec![
                Regex::new(r#"\bfolder\s*[:=]\s*(?:"([^"]+)"|(\S+))"#)?,
                Regex::new(r#"\bin\s+(?:the\s+)?(?:folder|directory)\s+(?:"([^"]+)"|(\S+))"#)?,
                Regex::new(r"\bin\s+()([\p{L}\p{N}_.-]+(?:/[\p{L}\p{N}_.-]+)+/?)")?,
            ],
            priority_list_re: Regex::new(&format!(
                r"\b(?:priority|prio)\s*[:=]?\s*({v}(?:{sep}{v})*)\b",
                v = priority_value,
                sep = LIST_SEP
            ))?,
            priority_word_re: match priority_words {
                Some(w) => Some(Regex::new(&format!(r"\b({w})(?:\s+priority)?\b"))?),
                None => None,
            },
            range_between_re: Regex::new(&format!(
                r"\b(?:due\s+)?between\s+({d})\s+and\s+({d})(?:\s|$|[,.;!?])",
                d = DATE_EXPR
            ))?,
            range_from_re: Regex::new(&format!(
                r"\b(?:due\s+)?from\s+({d})\s+(?:to|until|through|till)\s+({d})(?:\s|$|[,.;!?])",
                d = DATE_EXPR
            ))?,
            range_single_re: Regex::new(&format!(
                r"\b(?:due\s+)?(before|after|by|until)\s+({d})(?:\s|$|[,.;!?])",
                d = DATE_EXPR
            ))?,
            due_token_re: Regex::new(
                r"\b(?:due\s+)?(today|tomorrow|overdue|this\s+week|next\s+week|future)\b|(?:^|\s)(?:due\s+)?([+-]\d+d)\b",
            )?,
            status_list_re: Regex::new(&format!(
                r"\bstatus\s*[:=]?\s*((?:{v})(?:{sep}(?:{v}))*)\b",
                v = status_value,
                sep = LIST_SEP
            ))?,
            status_word_re: match status_words {
                Some(w) => Some(Regex::new(&format!(r"\b({w})\b"))?),
                None => None,
            },
            list_sep_re: Regex::new(LIST_SEP)?,
            stop_words: StopWords::new(&config.stop_words),
            priority,
            status,
        })
    }

    /// Parse `query` into a [`QueryIntent`].
    pub fn extract(&self, query: &str) -> QueryIntent {
        let mut work = query.to_lowercase();
        let mut intent = QueryIntent {
            extracted_tags: self.extract_tags(&mut work),
            extracted_folder: self.extract_folder(&mut work),
            ..Default::default()
        };

        intent.extracted_priority = OneOrMany::from_vec(self.extract_priority(&mut work));
        // Relative tokens are always consumed but only used without a range.
        let range = self.extract_due_range(&mut work);
        let token = self.extract_due_token(&mut work);
        intent.extracted_due_date = match (range, token) {
            (Some(range), _) => Some(DueDateIntent::Range(range)),
            (None, Some(token)) => Some(DueDateIntent::Filter(token)),
            (None, None) => None,
        };
        intent.extracted_status = OneOrMany::from_vec(self.extract_status(&mut work));
        intent.keywords = self.extract_keywords(&work);
        intent.refresh_flags();

        debug!(
            keywords = ?intent.keywords,
            properties = intent.property_count(),
            vague = intent.is_vague,
            "extracted query intent"
        );
        intent
    }

    /// Keywords only: tokenize, drop stop words, dedupe keeping first occurrence.
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let tokens = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !(t.len() == 1 && t.is_ascii()));
        for t in self.stop_words.filter(tokens) {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }

    fn extract_tags(&self, work: &mut String) -> Vec<String> {
        let mut tags = Vec::new();
        let mut spans = Vec::new();
        for caps in self.tag_re.captures_iter(work) {
            let tag = caps[1].trim_end_matches('/').to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
            if let Some(m) = caps.get(0) {
                spans.push(m.range());
            }
        }
        blank(work, &spans);
        tags
    }

    fn extract_folder(&self, work: &mut String) -> Option<String> {
        for re in &self.folder_res {
            let found = re.captures(work).and_then(|caps| {
                let value = caps.get(1).filter(|m| !m.as_str().is_empty()).or_else(|| caps.get(2))?;
                let folder = value.as_str().trim().trim_matches('/').to_string();
                let span = caps.get(0)?.range();
                Some((folder, span))
            });
            if let Some((folder, span)) = found {
                blank(work, &[span]);
                if !folder.is_empty() {
                    return Some(folder);
                }
            }
        }
        None
    }

    fn priority_level(&self, token: &str) -> u8 {
        let t = token.trim();
        if let Ok(n) = t.parse::<u8>() {
            return if (1..=4).contains(&n) { n } else { 0 };
        }
        if let Some(n) = t.strip_prefix('p').and_then(|d| d.parse::<u8>().ok()) {
            if (1..=4).contains(&n) {
                return n;
            }
        }
        self.priority.resolve(t)
    }

    fn extract_priority(&self, work: &mut String) -> Vec<u8> {
        let mut levels: Vec<u8> = Vec::new();
        let push = |level: u8, levels: &mut Vec<u8>| {
            if level > 0 && !levels.contains(&level) {
                levels.push(level);
            }
        };

        let mut spans = Vec::new();
        for caps in self.priority_list_re.captures_iter(work) {
            for part in self.list_sep_re.split(&caps[1]) {
                push(self.priority_level(part), &mut levels);
            }
            spans.extend(caps.get(0).map(|m| m.range()));
        }
        blank(work, &spans);

        if let Some(re) = &self.priority_word_re {
            let mut spans = Vec::new();
            for caps in re.captures_iter(work) {
                push(self.priority_level(&caps[1]), &mut levels);
                spans.extend(caps.get(0).map(|m| m.range()));
            }
            blank(work, &spans);
        }
        levels
    }

    /// First range phrase wins. A phrase with an unparseable date is consumed
    /// but yields no range.
    fn extract_due_range(&self, work: &mut String) -> Option<DateRange> {
        let span_of = |caps: &Captures| caps.get(0).map(|m| m.range()).unwrap_or(0..0);

        let found = if let Some(caps) = self
            .range_between_re
            .captures(work)
            .or_else(|| self.range_from_re.captures(work))
        {
            let range = (is_date_expr(&caps[1]) && is_date_expr(&caps[2]))
                .then(|| DateRange::between(&caps[1], &caps[2]));
            Some((range, span_of(&caps)))
        } else {
            self.range_single_re.captures(work).map(|caps| {
                let operator = match &caps[1] {
                    "before" => DateOperator::Lt,
                    "after" => DateOperator::Gt,
                    _ => DateOperator::Le,
                };
                let range = is_date_expr(&caps[2]).then(|| DateRange::op(operator, &caps[2]));
                (range, span_of(&caps))
            })
        };

        let (range, span) = found?;
        blank(work, &[span]);
        if range.is_none() {
            debug!("dropping due date range with unparseable date");
        }
        range
    }

    fn extract_due_token(&self, work: &mut String) -> Option<String> {
        let mut first: Option<String> = None;
        let mut spans = Vec::new();
        for caps in self.due_token_re.captures_iter(work) {
            let token = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));
            if first.is_none() {
                first = token.filter(|t| is_due_filter_token(t));
            }
            spans.extend(caps.get(0).map(|m| m.range()));
        }
        blank(work, &spans);
        first
    }

    fn extract_status(&self, work: &mut String) -> Vec<StatusCategory> {
        let mut out: Vec<StatusCategory> = Vec::new();
        let push = |alias: &str, out: &mut Vec<StatusCategory>| {
            let alias = alias.split_whitespace().collect::<Vec<_>>().join(" ");
            if let Some(c) = self.status.resolve_alias(&alias) {
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        };

        let mut spans = Vec::new();
        for caps in self.status_list_re.captures_iter(work) {
            for part in self.list_sep_re.split(&caps[1]) {
                push(part, &mut out);
            }
            spans.extend(caps.get(0).map(|m| m.range()));
        }
        blank(work, &spans);

        if let Some(re) = &self.status_word_re {
            let mut spans = Vec::new();
            for caps in re.captures_iter(work) {
                push(&caps[1], &mut out);
                spans.extend(caps.get(0).map(|m| m.range()));
            }
            blank(work, &spans);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> IntentExtractor {
        IntentExtractor::new(&SearchConfig::default()).unwrap()
    }

    #[test]
    fn multi_value_priority_with_due_and_status() {
        let intent = extractor().extract("priority 1 or 2, due today, status open");
        assert_eq!(intent.extracted_priority, Some(OneOrMany::Many(vec![1, 2])));
        assert_eq!(intent.due_date_filter(), Some("today"));
        assert_eq!(intent.extracted_status, Some(OneOrMany::One(StatusCategory::Open)));
        assert!(intent.keywords.is_empty());
        assert!(intent.is_priority && intent.is_due_date && intent.has_multiple_filters);
        assert!(!intent.is_search && !intent.is_vague);
    }

    #[test]
    fn vague_query_has_nothing_extracted() {
        let intent = extractor().extract("what should I do");
        assert!(intent.is_vague);
        assert!(intent.keywords.is_empty());
        assert_eq!(intent.extracted_priority, None);
        assert_eq!(intent.extracted_status, None);
        assert_eq!(intent.extracted_due_date, None);
        assert_eq!(intent.extracted_folder, None);
        assert!(intent.extracted_tags.is_empty());
    }

    #[test]
    fn configured_alias_resolves_priority() {
        let mut cfg = SearchConfig::default();
        cfg.priority_mapping.p1 = vec!["1".into(), "critical".into()];
        cfg.priority_mapping.p2 = vec!["2".into(), "urgent".into()];
        let ex = IntentExtractor::new(&cfg).unwrap();

        let intent = ex.extract("critical bugs");
        assert_eq!(intent.extracted_priority, Some(OneOrMany::One(1)));
        assert_eq!(intent.keywords, vec!["bugs"]);

        let intent = ex.extract("Urgent stuff");
        assert_eq!(intent.extracted_priority, Some(OneOrMany::One(2)));
    }

    #[test]
    fn priority_forms() {
        let ex = extractor();
        assert_eq!(ex.extract("p2 tasks").extracted_priority, Some(OneOrMany::One(2)));
        assert_eq!(
            ex.extract("priority: high, medium").extracted_priority,
            Some(OneOrMany::Many(vec![1, 2]))
        );
        assert_eq!(
            ex.extract("high priority email").extracted_priority,
            Some(OneOrMany::One(1))
        );
        assert_eq!(ex.extract("high priority email").keywords, vec!["email"]);
        // out-of-range digits are not priorities
        assert_eq!(ex.extract("priority 7 things").extracted_priority, None);
    }

    #[test]
    fn ranges_take_precedence_over_tokens() {
        let ex = extractor();
        let intent = ex.extract("report due before 2026-03-01 today");
        assert_eq!(
            intent.due_date_range(),
            Some(&DateRange::op(DateOperator::Lt, "2026-03-01"))
        );
        assert_eq!(intent.due_date_filter(), None);

        let intent = ex.extract("between 2026-03-01 and 2026-03-10 invoices");
        assert_eq!(
            intent.due_date_range(),
            Some(&DateRange::between("2026-03-01", "2026-03-10"))
        );
        assert_eq!(intent.keywords, vec!["invoices"]);

        let intent = ex.extract("from today to +7d");
        assert_eq!(intent.due_date_range(), Some(&DateRange::between("today", "+7d")));

        let intent = ex.extract("after tomorrow");
        assert_eq!(intent.due_date_range(), Some(&DateRange::op(DateOperator::Gt, "tomorrow")));
    }

    #[test]
    fn malformed_dates_are_dropped_not_fatal() {
        let intent = extractor().extract("taxes due before 2026-13-45");
        assert_eq!(intent.extracted_due_date, None);
        assert_eq!(intent.keywords, vec!["taxes"]);
    }

    #[test]
    fn relative_tokens() {
        let ex = extractor();
        assert_eq!(ex.extract("overdue bills").due_date_filter(), Some("overdue"));
        assert_eq!(ex.extract("due this  week").due_date_filter(), Some("this week"));
        assert_eq!(ex.extract("due +3d").due_date_filter(), Some("+3d"));
        assert_eq!(ex.extract("overdue bills").keywords, vec!["bills"]);
    }

    #[test]
    fn oversized_offsets_are_consumed_and_dropped() {
        let ex = extractor();
        let intent = ex.extract("due +200000000000d");
        assert_eq!(intent.extracted_due_date, None);
        assert!(intent.keywords.is_empty());

        let intent = ex.extract("taxes before +200000000000d");
        assert_eq!(intent.extracted_due_date, None);
        assert_eq!(intent.keywords, vec!["taxes"]);

        let intent = ex.extract("taxes before +2000000000000000000w");
        assert_eq!(intent.extracted_due_date, None);
    }

    #[test]
    fn consumed_spans_are_not_reread() {
        let ex = extractor();
        // The priority digit and the digits inside the dates stay with their own extractor.
        let intent = ex.extract("priority 2 between 2026-03-01 and 2026-03-04 taxes");
        assert_eq!(intent.extracted_priority, Some(OneOrMany::One(2)));
        assert_eq!(
            intent.due_date_range(),
            Some(&DateRange::between("2026-03-01", "2026-03-04"))
        );
        assert_eq!(intent.keywords, vec!["taxes"]);

        let intent = ex.extract("p1 before 2026-04-02");
        assert_eq!(intent.extracted_priority, Some(OneOrMany::One(1)));
        assert_eq!(
            intent.due_date_range(),
            Some(&DateRange::op(DateOperator::Lt, "2026-04-02"))
        );
        assert!(intent.keywords.is_empty());
    }

    #[test]
    fn tags_and_folders() {
        let ex = extractor();
        let intent = ex.extract("#work #Home/Garden fix fence");
        assert_eq!(intent.extracted_tags, vec!["work", "home/garden"]);
        assert_eq!(intent.keywords, vec!["fix", "fence"]);

        let intent = ex.extract("tasks in Projects/Alpha about launch");
        assert_eq!(intent.extracted_folder.as_deref(), Some("projects/alpha"));
        assert_eq!(intent.keywords, vec!["launch"]);

        let intent = ex.extract(r#"folder:"Daily Notes" standup"#);
        assert_eq!(intent.extracted_folder.as_deref(), Some("daily notes"));
        assert_eq!(intent.keywords, vec!["standup"]);
    }

    #[test]
    fn status_synonyms_and_lists() {
        let ex = extractor();
        assert_eq!(
            ex.extract("status: done, cancelled").extracted_status,
            Some(OneOrMany::Many(vec![StatusCategory::Completed, StatusCategory::Cancelled]))
        );
        assert_eq!(
            ex.extract("in progress reviews").extracted_status,
            Some(OneOrMany::One(StatusCategory::InProgress))
        );
    }

    #[test]
    fn keywords_are_ordered_and_deduplicated() {
        let intent = extractor().extract("Budget review budget for Q3 review");
        assert_eq!(intent.keywords, vec!["budget", "review", "q3"]);
        assert!(intent.is_search);
    }

    #[test]
    fn garbage_input_degrades_to_vague() {
        let intent = extractor().extract("?? !! -- ## ::");
        assert!(intent.is_vague);
        let intent = extractor().extract("");
        assert!(intent.is_vague);
    }
}
