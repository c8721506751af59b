//! Search pipeline: intent, filter, score, quality cut, rank, limit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ChatMode, SearchConfig};
use crate::error::Result;
use crate::extractor::IntentExtractor;
use crate::filter::TaskFilter;
use crate::intent::QueryIntent;
use crate::parsed::ParsedQuery;
use crate::ranking::{rank, SortCriterion, SortPlan};
use crate::scoring::{ScoredTask, ScoringContext};
use crate::task::{StatusCategory, Task};
use crate::time::local_today;

/// Adaptive quality cut: keep tasks scoring at least this share of the best.
pub const ADAPTIVE_QUALITY_RATIO: f64 = 0.25;

#[derive(Debug, Clone)]
pub enum QueryInput {
    Text(String),
    Parsed(ParsedQuery),
    /// A parsed query whose raw text is extracted instead when the parse is rejected.
    ParsedOrText { parsed: ParsedQuery, text: String },
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: QueryInput,
    pub mode: ChatMode,
    /// Manual filter, combined conjunctively with the intent's constraints.
    pub filter: Option<TaskFilter>,
    /// Overrides the mode's configured plan.
    pub sort: Option<SortPlan>,
    /// Overrides the mode's configured result limit.
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn text(query: impl Into<String>) -> Self {
        Self::new(QueryInput::Text(query.into()))
    }

    pub fn parsed(parsed: ParsedQuery) -> Self {
        Self::new(QueryInput::Parsed(parsed))
    }

    pub fn parsed_or_text(parsed: ParsedQuery, text: impl Into<String>) -> Self {
        Self::new(QueryInput::ParsedOrText {
            parsed,
            text: text.into(),
        })
    }

    fn new(query: QueryInput) -> Self {
        Self {
            query,
            mode: ChatMode::Simple,
            filter: None,
            sort: None,
            limit: None,
        }
    }

    pub fn with_mode(mut self, mode: ChatMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_sort(mut self, plan: SortPlan) -> Self {
        self.sort = Some(plan);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub total: usize,
    pub filtered: usize,
    pub qualified: usize,
    pub returned: usize,
    pub cache_hits: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub today: NaiveDate,
    pub mode: ChatMode,
    pub intent: QueryIntent,
    pub sort_plan: Vec<SortCriterion>,
    pub counts: StageCounts,
    /// Ranked tasks. In chat mode, the context handed to an assistant.
    pub results: Vec<ScoredTask>,
    /// How many of `results` are recommended back to the user.
    pub recommendation_limit: usize,
}

impl SearchOutcome {
    pub fn recommended(&self) -> &[ScoredTask] {
        &self.results[..self.recommendation_limit.min(self.results.len())]
    }
}

pub struct SearchPipeline {
    config: SearchConfig,
    extractor: IntentExtractor,
}

impl SearchPipeline {
    /// Validates `config` and compiles the extractor once.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let extractor = IntentExtractor::new(&config)?;
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn extract(&self, query: &str) -> QueryIntent {
        self.extractor.extract(query)
    }

    pub fn run(&self, request: SearchRequest, tasks: &mut [Task], now: DateTime<Utc>) -> Result<SearchOutcome> {
        let today = local_today(now, &self.config.timezone)?;

        let (intent, suggested) = match request.query {
            QueryInput::Text(q) => (self.extractor.extract(&q), None),
            QueryInput::Parsed(p) => p.into_intent(&self.config)?,
            QueryInput::ParsedOrText { parsed, text } => match parsed.into_intent(&self.config) {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(%err, "parsed query rejected, extracting from text");
                    (self.extractor.extract(&text), None)
                }
            },
        };

        let intent_filter = intent.to_filter(today).compile(today);
        let manual = request
            .filter
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| f.compile(today));
        let targets_completed = request
            .filter
            .as_ref()
            .is_some_and(|f| f.targets_status(StatusCategory::Completed));

        let ctx = ScoringContext::new(&intent, today, self.config.scoring, targets_completed);
        let mut counts = StageCounts {
            total: tasks.len(),
            ..Default::default()
        };

        let mut scored = Vec::new();
        for task in tasks.iter_mut() {
            if !intent_filter.matches(task) || manual.as_ref().is_some_and(|m| !m.matches(task)) {
                continue;
            }
            let (scores, hit) = ctx.score_cached(task);
            if hit {
                counts.cache_hits += 1;
            }
            scored.push(ScoredTask {
                task: task.clone(),
                scores,
            });
        }
        counts.filtered = scored.len();
        debug!(
            filtered = counts.filtered,
            cache_hits = counts.cache_hits,
            signature = ctx.signature(),
            "scored filtered tasks"
        );

        if let Some(min) = self.quality_threshold(&intent, &scored) {
            scored.retain(|t| t.scores.final_score >= min);
            debug!(threshold = min, kept = scored.len(), "applied quality filter");
        }
        counts.qualified = scored.len();

        let plan = request
            .sort
            .unwrap_or_else(|| self.config.sort.plan(request.mode))
            .resolve(suggested.as_deref());

        let (limit, recommendation_limit) = match (request.mode, request.limit) {
            (ChatMode::Chat, Some(n)) => (self.config.limits.max_tasks_for_ai, n),
            (ChatMode::Chat, None) => (
                self.config.limits.max_tasks_for_ai,
                self.config.limits.max_recommendations,
            ),
            (_, Some(n)) => (n, n),
            (mode, None) => (self.config.limit(mode), self.config.limit(mode)),
        };

        let results = rank(scored, &plan, limit);
        counts.returned = results.len();
        info!(
            mode = ?request.mode,
            total = counts.total,
            returned = counts.returned,
            "search finished"
        );

        Ok(SearchOutcome {
            today,
            mode: request.mode,
            intent,
            sort_plan: plan.criteria().to_vec(),
            counts,
            results,
            recommendation_limit,
        })
    }

    /// Fixed minimum when configured. Otherwise an adaptive cut relative to
    /// the best score, applied only to keyword searches.
    fn quality_threshold(&self, intent: &QueryIntent, scored: &[ScoredTask]) -> Option<f64> {
        let strength = self.config.quality_filter_strength;
        if strength > 0.0 {
            return Some(strength);
        }
        if intent.keywords.is_empty() {
            return None;
        }
        let best = scored
            .iter()
            .map(|t| t.scores.final_score)
            .fold(f64::NEG_INFINITY, f64::max);
        (best > 0.0).then(|| best * ADAPTIVE_QUALITY_RATIO)
    }
}
