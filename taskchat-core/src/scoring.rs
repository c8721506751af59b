//! Scoring engine: relevance, due-date urgency, priority and status
//! components plus a weighted final score.
//!
//! Every component is bounded and contributes 0 when the task lacks the
//! underlying field. Results may be cached on the task record, keyed by a
//! signature of the scoring-relevant intent fields and the current day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::intent::QueryIntent;
use crate::task::{normalize_tag, StatusCategory, Task};

/// Keyword found as a whole word in the task text.
pub const WORD_MATCH_SCORE: f64 = 1.0;
/// Keyword found only as a substring.
pub const PARTIAL_MATCH_SCORE: f64 = 0.5;
/// Keyword equal to (or a parent of) one of the task's tags.
pub const TAG_MATCH_BONUS: f64 = 0.5;
/// Per-position decay: keyword `i` is weighted `1 / (1 + decay * i)`.
pub const KEYWORD_POSITION_DECAY: f64 = 0.25;
/// All keywords appear in order as one phrase.
pub const PHRASE_MATCH_BONUS: f64 = 1.0;

/// Plateau for anything due before today.
pub const OVERDUE_URGENCY: f64 = 1.5;
pub const DUE_TODAY_URGENCY: f64 = 1.0;
/// Urgency halves every this many days after today.
pub const DUE_HALF_LIFE_DAYS: f64 = 7.0;

/// Indexed by priority level; 0 = none.
pub const PRIORITY_SCORES: [f64; 5] = [0.0, 1.0, 0.75, 0.5, 0.25];

pub const STATUS_IN_PROGRESS: f64 = 1.0;
pub const STATUS_OPEN: f64 = 0.8;
pub const STATUS_OTHER: f64 = 0.3;
pub const STATUS_CANCELLED: f64 = 0.1;
/// Completed tasks, only when the query asks for them.
pub const STATUS_COMPLETED_TARGETED: f64 = 0.8;

/// Coefficients of the final linear combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub due_date: f64,
    pub priority: f64,
    pub status: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            relevance: 20.0,
            due_date: 4.0,
            priority: 1.0,
            status: 1.0,
        }
    }
}

impl ScoringWeights {
    fn hash_into<H: Hasher>(&self, h: &mut H) {
        for w in [self.relevance, self.due_date, self.priority, self.status] {
            w.to_bits().hash(h);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub relevance: f64,
    pub due_date: f64,
    pub priority: f64,
    pub status: f64,
    pub final_score: f64,
}

/// Cache entry stored on a task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedScores {
    pub signature: u64,
    /// Coarse time bucket the scores were computed for.
    pub today: NaiveDate,
    pub components: ScoreComponents,
}

/// A task paired with its score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTask {
    pub task: Task,
    pub scores: ScoreComponents,
}

/// Keyword relevance. Not normalized by keyword count.
pub fn relevance_score(task: &Task, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let text = task.text.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let tags: Vec<String> = task
        .tags
        .iter()
        .chain(task.note_tags.iter())
        .map(|t| normalize_tag(t))
        .collect();

    let mut total = 0.0;
    for (i, kw) in keywords.iter().enumerate() {
        let kw = kw.trim().to_lowercase();
        if kw.is_empty() {
            continue;
        }
        let weight = 1.0 / (1.0 + KEYWORD_POSITION_DECAY * i as f64);

        let whole = if kw.contains(char::is_whitespace) {
            text.contains(&kw)
        } else {
            words.iter().any(|w| *w == kw)
        };
        let mut hit = if whole {
            WORD_MATCH_SCORE
        } else if text.contains(&kw) {
            PARTIAL_MATCH_SCORE
        } else {
            0.0
        };
        if tags.iter().any(|t| *t == kw || t.starts_with(&format!("{kw}/"))) {
            hit += TAG_MATCH_BONUS;
        }
        total += hit * weight;
    }

    if keywords.len() >= 2 {
        let phrase = keywords.join(" ").to_lowercase();
        if text.contains(&phrase) {
            total += PHRASE_MATCH_BONUS;
        }
    }
    total
}

/// Due-date urgency in `0.0..=OVERDUE_URGENCY`, non-increasing in days-to-due.
pub fn due_date_urgency(due: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let Some(due) = due else {
        return 0.0;
    };
    let days = (due - today).num_days();
    if days < 0 {
        OVERDUE_URGENCY
    } else {
        DUE_TODAY_URGENCY * 0.5f64.powf(days as f64 / DUE_HALF_LIFE_DAYS)
    }
}

pub fn priority_score(priority: u8) -> f64 {
    PRIORITY_SCORES
        .get(priority as usize)
        .copied()
        .unwrap_or(0.0)
}

pub fn status_score(category: StatusCategory, targets_completed: bool) -> f64 {
    match category {
        StatusCategory::InProgress => STATUS_IN_PROGRESS,
        StatusCategory::Open => STATUS_OPEN,
        StatusCategory::Other => STATUS_OTHER,
        StatusCategory::Cancelled => STATUS_CANCELLED,
        StatusCategory::Completed if targets_completed => STATUS_COMPLETED_TARGETED,
        StatusCategory::Completed => 0.0,
    }
}

/// Per-query scoring state: the intent's keywords, the day, the weights and
/// the cache signature derived from them.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    keywords: Vec<String>,
    today: NaiveDate,
    weights: ScoringWeights,
    targets_completed: bool,
    signature: u64,
}

impl ScoringContext {
    /// `targets_completed` is true when the active status filter asks for
    /// completed tasks, either from the intent or from a manual filter.
    pub fn new(
        intent: &QueryIntent,
        today: NaiveDate,
        weights: ScoringWeights,
        targets_completed: bool,
    ) -> Self {
        let targets_completed =
            targets_completed || intent.targets_status(StatusCategory::Completed);

        let mut h = DefaultHasher::new();
        intent.keywords.hash(&mut h);
        intent.extracted_priority.hash(&mut h);
        intent.extracted_status.hash(&mut h);
        intent.extracted_due_date.hash(&mut h);
        intent.extracted_folder.hash(&mut h);
        intent.extracted_tags.hash(&mut h);
        targets_completed.hash(&mut h);
        weights.hash_into(&mut h);

        Self {
            keywords: intent.keywords.clone(),
            today,
            weights,
            targets_completed,
            signature: h.finish(),
        }
    }

    pub fn signature(&self) -> u64 {
        self.signature
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Compute all four components and the final score.
    pub fn score(&self, task: &Task) -> ScoreComponents {
        let relevance = relevance_score(task, &self.keywords);
        let due_date = due_date_urgency(task.due_date, self.today);
        let priority = priority_score(task.priority);
        let status = status_score(task.status_category, self.targets_completed);
        let w = &self.weights;
        ScoreComponents {
            relevance,
            due_date,
            priority,
            status,
            final_score: w.relevance * relevance
                + w.due_date * due_date
                + w.priority * priority
                + w.status * status,
        }
    }

    /// Like [`score`](Self::score) but reads and refreshes the task's cache.
    ///
    /// Returns the components and whether they came from the cache.
    pub fn score_cached(&self, task: &mut Task) -> (ScoreComponents, bool) {
        if let Some(c) = task.cached_scores {
            if c.signature == self.signature && c.today == self.today {
                return (c.components, true);
            }
        }
        let components = self.score(task);
        task.cached_scores = Some(CachedScores {
            signature: self.signature,
            today: self.today,
            components,
        });
        (components, false)
    }
}

/// Score one task against `intent` with default weights.
pub fn score(task: &Task, intent: &QueryIntent, today: NaiveDate) -> ScoreComponents {
    ScoringContext::new(intent, today, ScoringWeights::default(), false).score(task)
}
