//! Structured interpretation of a free-form query.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date_range::{due_filter_range, DateRange};
use crate::filter::TaskFilter;
use crate::task::StatusCategory;

/// Single-or-multi value property. A one-element list collapses to `One`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn from_vec(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(OneOrMany::One),
            _ => Some(OneOrMany::Many(values)),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(vs) => vs,
        }
    }
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.as_slice().contains(value)
    }
}

/// Extracted due-date constraint: a relative token or an explicit range,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DueDateIntent {
    /// Relative token such as `today`, `overdue`, `+3d`.
    Filter(String),
    Range(DateRange),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "QueryIntentRepr", into = "QueryIntentRepr")]
pub struct QueryIntent {
    pub is_search: bool,
    pub is_priority: bool,
    pub is_due_date: bool,
    pub has_multiple_filters: bool,
    pub is_vague: bool,

    /// Deduplicated, in first-occurrence order; earlier keywords weigh more.
    pub keywords: Vec<String>,
    pub extracted_priority: Option<OneOrMany<u8>>,
    pub extracted_status: Option<OneOrMany<StatusCategory>>,
    pub extracted_due_date: Option<DueDateIntent>,
    pub extracted_folder: Option<String>,
    pub extracted_tags: Vec<String>,
}

impl QueryIntent {
    /// Number of populated property extractions.
    pub fn property_count(&self) -> usize {
        [
            self.extracted_priority.is_some(),
            self.extracted_status.is_some(),
            self.extracted_due_date.is_some(),
            self.extracted_folder.is_some(),
            !self.extracted_tags.is_empty(),
        ]
        .into_iter()
        .filter(|x| *x)
        .count()
    }

    /// Recompute the boolean flags from the extracted fields.
    pub fn refresh_flags(&mut self) {
        let props = self.property_count();
        self.is_search = !self.keywords.is_empty();
        self.is_priority = self.extracted_priority.is_some();
        self.is_due_date = self.extracted_due_date.is_some();
        self.has_multiple_filters = props >= 2;
        self.is_vague = self.keywords.is_empty() && props == 0;
    }

    pub fn due_date_filter(&self) -> Option<&str> {
        match &self.extracted_due_date {
            Some(DueDateIntent::Filter(token)) => Some(token),
            _ => None,
        }
    }

    pub fn due_date_range(&self) -> Option<&DateRange> {
        match &self.extracted_due_date {
            Some(DueDateIntent::Range(range)) => Some(range),
            _ => None,
        }
    }

    pub fn targets_status(&self, category: StatusCategory) -> bool {
        self.extracted_status
            .as_ref()
            .is_some_and(|s| s.contains(&category))
    }

    /// Property constraints of this intent as a structural filter.
    pub fn to_filter(&self, today: NaiveDate) -> TaskFilter {
        let priorities = self
            .extracted_priority
            .as_ref()
            .map(|p| p.as_slice().iter().map(|l| l.to_string()).collect())
            .unwrap_or_default();
        let task_statuses = self
            .extracted_status
            .as_ref()
            .map(|s| s.as_slice().iter().map(|c| c.code().to_string()).collect())
            .unwrap_or_default();

        let due_date_range = match &self.extracted_due_date {
            None => None,
            Some(DueDateIntent::Range(range)) => Some(range.clone()),
            Some(DueDateIntent::Filter(token)) => {
                let range = due_filter_range(token, today);
                if range.is_none() {
                    debug!(token = %token, "unknown due date token dropped");
                }
                range
            }
        };

        TaskFilter {
            folders: self.extracted_folder.iter().cloned().collect(),
            tags: self.extracted_tags.clone(),
            priorities,
            due_date_range,
            task_statuses,
            ..Default::default()
        }
    }
}

/// Wire shape: the due-date constraint is split over two optional fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QueryIntentRepr {
    is_search: bool,
    is_priority: bool,
    is_due_date: bool,
    has_multiple_filters: bool,
    is_vague: bool,
    keywords: Vec<String>,
    extracted_priority: Option<OneOrMany<u8>>,
    extracted_status: Option<OneOrMany<StatusCategory>>,
    extracted_due_date_filter: Option<String>,
    extracted_due_date_range: Option<DateRange>,
    extracted_folder: Option<String>,
    extracted_tags: Vec<String>,
}

impl From<QueryIntentRepr> for QueryIntent {
    fn from(r: QueryIntentRepr) -> Self {
        // A range is the more specific constraint; it wins if both arrive.
        let extracted_due_date = match (r.extracted_due_date_range, r.extracted_due_date_filter) {
            (Some(range), _) => Some(DueDateIntent::Range(range)),
            (None, Some(token)) => Some(DueDateIntent::Filter(token)),
            (None, None) => None,
        };
        QueryIntent {
            is_search: r.is_search,
            is_priority: r.is_priority,
            is_due_date: r.is_due_date,
            has_multiple_filters: r.has_multiple_filters,
            is_vague: r.is_vague,
            keywords: r.keywords,
            extracted_priority: r.extracted_priority,
            extracted_status: r.extracted_status,
            extracted_due_date,
            extracted_folder: r.extracted_folder,
            extracted_tags: r.extracted_tags,
        }
    }
}

impl From<QueryIntent> for QueryIntentRepr {
    fn from(i: QueryIntent) -> Self {
        let (extracted_due_date_filter, extracted_due_date_range) = match i.extracted_due_date {
            Some(DueDateIntent::Filter(token)) => (Some(token), None),
            Some(DueDateIntent::Range(range)) => (None, Some(range)),
            None => (None, None),
        };
        QueryIntentRepr {
            is_search: i.is_search,
            is_priority: i.is_priority,
            is_due_date: i.is_due_date,
            has_multiple_filters: i.has_multiple_filters,
            is_vague: i.is_vague,
            keywords: i.keywords,
            extracted_priority: i.extracted_priority,
            extracted_status: i.extracted_status,
            extracted_due_date_filter,
            extracted_due_date_range,
            extracted_folder: i.extracted_folder,
            extracted_tags: i.extracted_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateOperator;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn one_or_many_collapses_single_values() {
        assert_eq!(OneOrMany::<u8>::from_vec(vec![]), None);
        assert_eq!(OneOrMany::from_vec(vec![2u8]), Some(OneOrMany::One(2)));
        assert_eq!(OneOrMany::from_vec(vec![1u8, 2]), Some(OneOrMany::Many(vec![1, 2])));
        assert!(OneOrMany::Many(vec![1u8, 2]).contains(&2));
    }

    #[test]
    fn flags_follow_extractions() {
        let mut intent = QueryIntent {
            extracted_priority: Some(OneOrMany::One(1)),
            extracted_tags: vec!["work".into()],
            ..Default::default()
        };
        intent.refresh_flags();
        assert!(intent.is_priority);
        assert!(intent.has_multiple_filters);
        assert!(!intent.is_search);
        assert!(!intent.is_vague);

        let mut empty = QueryIntent::default();
        empty.refresh_flags();
        assert!(empty.is_vague);
    }

    #[test]
    fn relative_token_becomes_concrete_bounds() {
        let intent = QueryIntent {
            extracted_due_date: Some(DueDateIntent::Filter("overdue".into())),
            extracted_priority: Some(OneOrMany::Many(vec![1, 2])),
            extracted_status: Some(OneOrMany::One(StatusCategory::InProgress)),
            ..Default::default()
        };
        let f = intent.to_filter(d(2026, 2, 20));
        assert_eq!(f.priorities, vec!["1", "2"]);
        assert_eq!(f.task_statuses, vec!["inProgress"]);
        assert_eq!(
            f.due_date_range,
            Some(DateRange::Bounds {
                start: None,
                end: Some("2026-02-20".into())
            })
        );
    }

    #[test]
    fn json_uses_split_due_date_fields() {
        let intent = QueryIntent {
            extracted_due_date: Some(DueDateIntent::Range(DateRange::op(DateOperator::Lt, "2026-03-01"))),
            ..Default::default()
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert!(json["extractedDueDateFilter"].is_null());
        assert_eq!(json["extractedDueDateRange"]["operator"], "<");

        let back: QueryIntent = serde_json::from_value(json).unwrap();
        assert_eq!(back, intent);

        let both: QueryIntent = serde_json::from_str(
            r#"{"extractedDueDateFilter":"today","extractedDueDateRange":{"start":"2026-01-01"}}"#,
        )
        .unwrap();
        assert!(both.due_date_filter().is_none());
        assert!(both.due_date_range().is_some());
    }
}
