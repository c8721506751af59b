//! Query parse results handed in from outside the core.
//!
//! An AI parser produces [`AiParsedQuery`]; nothing in it is trusted until
//! [`AiParsedQuery::into_intent`] has validated it against the configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::SearchConfig;
use crate::date_range::{is_due_filter_token, DateRange};
use crate::error::{Error, Result};
use crate::intent::{DueDateIntent, OneOrMany, QueryIntent};
use crate::ranking::{SortCriterion, SortPlan};
use crate::task::normalize_tag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ParsedQuery {
    Simple { intent: QueryIntent },
    Ai { result: AiParsedQuery },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiParsedQuery {
    pub keywords: Vec<String>,
    pub priority: Option<OneOrMany<u8>>,
    pub status: Option<OneOrMany<String>>,
    pub due_date: Option<String>,
    pub due_date_range: Option<DateRange>,
    pub folder: Option<String>,
    pub tags: Vec<String>,
    /// Suggested criteria for an `auto` sort plan.
    pub sort_order: Vec<String>,
}

impl ParsedQuery {
    /// Validated intent plus any suggested sort order.
    pub fn into_intent(self, config: &SearchConfig) -> Result<(QueryIntent, Option<Vec<SortCriterion>>)> {
        match self {
            ParsedQuery::Simple { mut intent } => {
                intent.refresh_flags();
                Ok((intent, None))
            }
            ParsedQuery::Ai { result } => {
                let order = result.suggested_order();
                Ok((result.into_intent(config)?, order))
            }
        }
    }
}

impl AiParsedQuery {
    pub fn suggested_order(&self) -> Option<Vec<SortCriterion>> {
        let plan = SortPlan::parse(&self.sort_order);
        (!plan.is_empty()).then(|| plan.criteria().to_vec())
    }

    pub fn into_intent(self, config: &SearchConfig) -> Result<QueryIntent> {
        let extracted_due_date = match (self.due_date, self.due_date_range) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_parse(
                    "dueDate and dueDateRange are mutually exclusive",
                ));
            }
            (Some(token), None) => {
                let token = token.trim().to_lowercase();
                if !is_due_filter_token(&token) {
                    return Err(Error::invalid_parse(format!("unknown due date filter '{token}'")));
                }
                Some(DueDateIntent::Filter(token))
            }
            (None, Some(range)) => Some(DueDateIntent::Range(range)),
            (None, None) => None,
        };

        let priorities = self.priority.map(|p| p.as_slice().to_vec()).unwrap_or_default();
        if let Some(bad) = priorities.iter().find(|p| !(1..=4).contains(*p)) {
            return Err(Error::invalid_parse(format!("priority {bad} is outside 1..=4")));
        }
        let mut levels: Vec<u8> = Vec::new();
        for p in priorities {
            if !levels.contains(&p) {
                levels.push(p);
            }
        }

        let mut statuses = Vec::new();
        for alias in self.status.map(|s| s.as_slice().to_vec()).unwrap_or_default() {
            match config.status_mapping.resolve_alias(&alias.to_lowercase()) {
                Some(c) if !statuses.contains(&c) => statuses.push(c),
                Some(_) => {}
                None => warn!(status = %alias, "dropping unknown status from parsed query"),
            }
        }

        let mut keywords: Vec<String> = Vec::new();
        for k in self.keywords {
            let k = k.trim().to_lowercase();
            if !k.is_empty() && !keywords.contains(&k) {
                keywords.push(k);
            }
        }

        let mut intent = QueryIntent {
            keywords,
            extracted_priority: OneOrMany::from_vec(levels),
            extracted_status: OneOrMany::from_vec(statuses),
            extracted_due_date,
            extracted_folder: self
                .folder
                .map(|f| f.trim().trim_matches('/').to_string())
                .filter(|f| !f.is_empty()),
            extracted_tags: self
                .tags
                .iter()
                .map(|t| normalize_tag(t))
                .filter(|t| !t.is_empty())
                .collect(),
            ..Default::default()
        };
        intent.refresh_flags();
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::StatusCategory;

    #[test]
    fn ai_result_is_validated_and_flags_recomputed() {
        let parsed: ParsedQuery = serde_json::from_str(
            r##"{
                "source": "ai",
                "result": {
                    "keywords": ["Budget", "budget", "report"],
                    "priority": [1, 2],
                    "status": ["in progress", "someday"],
                    "dueDate": "This Week",
                    "tags": ["#Work"],
                    "sortOrder": ["dueDate", "nonsense", "priority"]
                }
            }"##,
        )
        .unwrap();
        let (intent, order) = parsed.into_intent(&SearchConfig::default()).unwrap();
        assert_eq!(intent.keywords, vec!["budget", "report"]);
        assert_eq!(intent.extracted_priority, Some(OneOrMany::Many(vec![1, 2])));
        assert_eq!(intent.extracted_status, Some(OneOrMany::One(StatusCategory::InProgress)));
        assert_eq!(intent.due_date_filter(), Some("this week"));
        assert!(intent.is_search && intent.is_priority && intent.has_multiple_filters);
        assert_eq!(order, Some(vec![SortCriterion::DueDate, SortCriterion::Priority]));
    }

    #[test]
    fn rejects_conflicting_or_out_of_range_values() {
        let cfg = SearchConfig::default();
        let both = AiParsedQuery {
            due_date: Some("today".into()),
            due_date_range: Some(DateRange::between("2026-01-01", "2026-01-31")),
            ..Default::default()
        };
        assert!(matches!(both.into_intent(&cfg), Err(Error::InvalidParse { .. })));

        let bad = AiParsedQuery {
            priority: Some(OneOrMany::One(5)),
            ..Default::default()
        };
        assert!(bad.into_intent(&cfg).is_err());
    }

    #[test]
    fn simple_source_passes_through() {
        let intent = QueryIntent {
            keywords: vec!["garden".into()],
            is_vague: true,
            ..Default::default()
        };
        let (back, order) = ParsedQuery::Simple { intent }
            .into_intent(&SearchConfig::default())
            .unwrap();
        assert!(back.is_search);
        assert!(!back.is_vague);
        assert_eq!(order, None);
    }
}
