//! Due-date ranges: explicit bounds, operator forms, and relative filter tokens.
//!
//! Every form normalizes to an inclusive [`DateInterval`] before filtering.
//! A bound that cannot be parsed makes the whole range unusable (`None`), and
//! callers drop it instead of failing.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::time::{parse_offset_days, resolve_date, week_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "between")]
    Between,
}

/// Date range as carried by intents and filters.
///
/// Dates are kept as expressions (ISO or relative like `today`, `+3d`) so a
/// range can be built before "today" is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRange {
    Operator { operator: DateOperator, date: String },
    Bounds {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

/// Inclusive interval of calendar dates. May be empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn day(d: NaiveDate) -> Self {
        Self { start: d, end: d }
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl DateRange {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange::Bounds {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    pub fn op(operator: DateOperator, date: impl Into<String>) -> Self {
        DateRange::Operator {
            operator,
            date: date.into(),
        }
    }

    /// Resolve to a concrete inclusive interval.
    pub fn normalize(&self, today: NaiveDate) -> Option<DateInterval> {
        match self {
            DateRange::Bounds { start, end } => {
                let start = match start.as_deref() {
                    Some(s) => resolve_date(s, today)?,
                    None => NaiveDate::MIN,
                };
                let end = match end.as_deref() {
                    Some(e) => resolve_date(e, today)?,
                    None => NaiveDate::MAX,
                };
                Some(DateInterval::new(start, end))
            }
            DateRange::Operator { operator, date } => {
                let d = resolve_date(date, today)?;
                let one = Duration::days(1);
                let interval = match operator {
                    DateOperator::Lt => DateInterval::new(NaiveDate::MIN, d.checked_sub_signed(one)?),
                    DateOperator::Le => DateInterval::new(NaiveDate::MIN, d),
                    DateOperator::Gt => DateInterval::new(d.checked_add_signed(one)?, NaiveDate::MAX),
                    DateOperator::Ge => DateInterval::new(d, NaiveDate::MAX),
                    DateOperator::Eq => DateInterval::day(d),
                    DateOperator::Between => DateInterval::new(d.min(today), d.max(today)),
                };
                Some(interval)
            }
        }
    }
}

/// Relative due-date filter vocabulary (besides `+Nd` / `-Nd`).
pub const DUE_FILTER_TOKENS: &[&str] = &[
    "today",
    "tomorrow",
    "overdue",
    "this week",
    "next week",
    "future",
];

/// Whether `token` is a recognized relative due-date filter.
pub fn is_due_filter_token(token: &str) -> bool {
    let t = token.trim().to_lowercase();
    DUE_FILTER_TOKENS.contains(&t.as_str()) || parse_offset_days(&t).is_some()
}

/// Interval selected by a relative due-date filter token.
///
/// `+Nd` covers today through N days ahead, `-Nd` the last N days through
/// today. `overdue` includes today.
pub fn due_filter_interval(token: &str, today: NaiveDate) -> Option<DateInterval> {
    let t = token.trim().to_lowercase();
    let interval = match t.as_str() {
        "today" => DateInterval::day(today),
        "tomorrow" => DateInterval::day(today + Duration::days(1)),
        "overdue" => DateInterval::new(NaiveDate::MIN, today),
        "this week" => {
            let (start, end) = week_bounds(today);
            DateInterval::new(start, end)
        }
        "next week" => {
            let (start, end) = week_bounds(today + Duration::days(7));
            DateInterval::new(start, end)
        }
        "future" => DateInterval::new(today + Duration::days(1), NaiveDate::MAX),
        other => {
            let days = parse_offset_days(other)?;
            let other_end = today.checked_add_signed(Duration::try_days(days)?)?;
            DateInterval::new(today.min(other_end), today.max(other_end))
        }
    };
    Some(interval)
}

/// A relative token as a concrete ISO [`DateRange`]. Unbounded ends stay open.
pub fn due_filter_range(token: &str, today: NaiveDate) -> Option<DateRange> {
    let interval = due_filter_interval(token, today)?;
    Some(DateRange::Bounds {
        start: (interval.start != NaiveDate::MIN).then(|| interval.start.to_string()),
        end: (interval.end != NaiveDate::MAX).then(|| interval.end.to_string()),
    })
}
