//! Ranking engine: stable multi-key sort over scored tasks.
//!
//! A sort plan is an ordered chain of tie-breaks. Ties left after the last
//! criterion keep input order (the order the filter emitted), so identical
//! inputs always rank identically.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::scoring::ScoredTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriterion {
    Relevance,
    DueDate,
    Priority,
    Created,
    Alphabetical,
    /// Resolved from an externally suggested ordering.
    Auto,
}

/// Plan used when `auto` has nothing to resolve to.
pub const DEFAULT_PLAN: [SortCriterion; 3] = [
    SortCriterion::Relevance,
    SortCriterion::DueDate,
    SortCriterion::Priority,
];

impl SortCriterion {
    pub fn as_str(self) -> &'static str {
        match self {
            SortCriterion::Relevance => "relevance",
            SortCriterion::DueDate => "dueDate",
            SortCriterion::Priority => "priority",
            SortCriterion::Created => "created",
            SortCriterion::Alphabetical => "alphabetical",
            SortCriterion::Auto => "auto",
        }
    }

    fn compare(self, a: &ScoredTask, b: &ScoredTask) -> Ordering {
        match self {
            // Higher score first for the three score-backed criteria.
            SortCriterion::Relevance => b.scores.relevance.total_cmp(&a.scores.relevance),
            SortCriterion::DueDate => b.scores.due_date.total_cmp(&a.scores.due_date),
            SortCriterion::Priority => b.scores.priority.total_cmp(&a.scores.priority),
            // Oldest first, undated last.
            SortCriterion::Created => match (a.task.created_date, b.task.created_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortCriterion::Alphabetical => a
                .task
                .text
                .trim()
                .to_lowercase()
                .cmp(&b.task.text.trim().to_lowercase()),
            SortCriterion::Auto => Ordering::Equal,
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort criterion: {0}")]
pub struct UnknownCriterion(pub String);

impl FromStr for SortCriterion {
    type Err = UnknownCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c = match s.trim().to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "relevance" | "relevant" => SortCriterion::Relevance,
            "duedate" | "due" => SortCriterion::DueDate,
            "priority" | "prio" => SortCriterion::Priority,
            "created" | "createddate" => SortCriterion::Created,
            "alphabetical" | "alpha" | "text" => SortCriterion::Alphabetical,
            "auto" => SortCriterion::Auto,
            _ => return Err(UnknownCriterion(s.to_string())),
        };
        Ok(c)
    }
}

/// Ordered list of tie-break criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortPlan(Vec<SortCriterion>);

impl SortPlan {
    pub fn new(criteria: Vec<SortCriterion>) -> Self {
        Self(criteria)
    }

    /// Parse tokens, skipping unknown ones.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let criteria = tokens
            .iter()
            .filter_map(|t| match t.as_ref().parse::<SortCriterion>() {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!(error = %e, "skipping sort token");
                    None
                }
            })
            .collect();
        Self(criteria)
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace `auto` with an external ordering, or with [`DEFAULT_PLAN`]
    /// when none is supplied. Later duplicates are dropped.
    pub fn resolve(&self, external: Option<&[SortCriterion]>) -> SortPlan {
        fn push(c: SortCriterion, out: &mut Vec<SortCriterion>) {
            if c != SortCriterion::Auto && !out.contains(&c) {
                out.push(c);
            }
        }

        let mut out: Vec<SortCriterion> = Vec::new();
        for &c in &self.0 {
            if c == SortCriterion::Auto {
                let replacement = external
                    .filter(|e| e.iter().any(|x| *x != SortCriterion::Auto))
                    .unwrap_or(&DEFAULT_PLAN[..]);
                for &r in replacement {
                    push(r, &mut out);
                }
            } else {
                push(c, &mut out);
            }
        }
        SortPlan(out)
    }
}

impl From<Vec<SortCriterion>> for SortPlan {
    fn from(v: Vec<SortCriterion>) -> Self {
        SortPlan(v)
    }
}

/// Stable sort by `plan`, then keep at most `limit` tasks.
pub fn rank(mut tasks: Vec<ScoredTask>, plan: &SortPlan, limit: usize) -> Vec<ScoredTask> {
    let plan = plan.resolve(None);
    tasks.sort_by(|a, b| {
        plan.criteria()
            .iter()
            .map(|c| c.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    tasks.truncate(limit);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreComponents;
    use crate::task::Task;
    use chrono::NaiveDate;

    fn scored(id: &str, relevance: f64, due: f64, priority: f64) -> ScoredTask {
        ScoredTask {
            task: Task::new(id, id),
            scores: ScoreComponents {
                relevance,
                due_date: due,
                priority,
                status: 0.8,
                final_score: 0.0,
            },
        }
    }

    fn ids(tasks: &[ScoredTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.task.id.as_str()).collect()
    }

    #[test]
    fn parse_skips_unknown_tokens() {
        let plan = SortPlan::parse(&["priority", "bogus", "due", "Alphabetical"]);
        assert_eq!(
            plan.criteria(),
            &[SortCriterion::Priority, SortCriterion::DueDate, SortCriterion::Alphabetical]
        );
        let err = "nope".parse::<SortCriterion>().unwrap_err();
        assert_eq!(err, UnknownCriterion("nope".into()));
        assert_eq!(err.to_string(), "unknown sort criterion: nope");
    }

    #[test]
    fn auto_resolves_to_external_or_default() {
        let plan = SortPlan::new(vec![SortCriterion::Auto, SortCriterion::Created]);
        assert_eq!(
            plan.resolve(None).criteria(),
            &[
                SortCriterion::Relevance,
                SortCriterion::DueDate,
                SortCriterion::Priority,
                SortCriterion::Created
            ]
        );
        let external = [SortCriterion::Priority, SortCriterion::Created];
        assert_eq!(
            plan.resolve(Some(&external)).criteria(),
            &[SortCriterion::Priority, SortCriterion::Created]
        );
    }

    #[test]
    fn tie_breaks_chain_and_stay_stable() {
        let tasks = vec![
            scored("far", 0.0, 0.2, 0.75),
            scored("tie1", 0.0, 0.5, 0.5),
            scored("near", 0.0, 0.9, 0.75),
            scored("tie2", 0.0, 0.5, 0.5),
        ];
        let plan = SortPlan::new(vec![SortCriterion::Priority, SortCriterion::DueDate]);
        let out = rank(tasks, &plan, 10);
        assert_eq!(ids(&out), vec!["near", "far", "tie1", "tie2"]);
    }

    #[test]
    fn truncates_after_sorting() {
        let tasks = vec![scored("a", 0.1, 0.0, 0.0), scored("b", 2.0, 0.0, 0.0), scored("c", 1.0, 0.0, 0.0)];
        let out = rank(tasks, &SortPlan::new(vec![SortCriterion::Relevance]), 2);
        assert_eq!(ids(&out), vec!["b", "c"]);
    }

    #[test]
    fn created_puts_undated_last_and_alphabetical_ignores_case() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        let mut a = scored("a", 0.0, 0.0, 0.0);
        a.task.text = "zebra".into();
        let mut b = scored("b", 0.0, 0.0, 0.0);
        b.task.text = "Apple".into();
        b.task.created_date = Some(d(10));
        let mut c = scored("c", 0.0, 0.0, 0.0);
        c.task.text = "mango".into();
        c.task.created_date = Some(d(2));

        let by_created = rank(
            vec![a.clone(), b.clone(), c.clone()],
            &SortPlan::new(vec![SortCriterion::Created]),
            10,
        );
        assert_eq!(ids(&by_created), vec!["c", "b", "a"]);

        let by_text = rank(vec![a, b, c], &SortPlan::new(vec![SortCriterion::Alphabetical]), 10);
        assert_eq!(ids(&by_text), vec!["b", "c", "a"]);
    }
}
