//! Search configuration passed explicitly into every entry point.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mapping::{PriorityMapping, StatusMapping};
use crate::ranking::SortPlan;
use crate::scoring::ScoringWeights;
use crate::stop_words::StopWordsConfig;
use crate::time::parse_timezone;

/// Query mode; picks the sort plan and result limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Pattern-based parsing, direct results.
    #[default]
    Simple,
    /// AI-parsed intent, direct results.
    Smart,
    /// Ranked tasks handed to an assistant as context.
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSection {
    pub simple: Vec<String>,
    pub smart: Vec<String>,
    pub chat: Vec<String>,
}

impl Default for SortSection {
    fn default() -> Self {
        let plan = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            simple: plan(&["relevance", "dueDate", "priority"]),
            smart: plan(&["relevance", "dueDate", "priority"]),
            chat: plan(&["auto"]),
        }
    }
}

impl SortSection {
    pub fn plan(&self, mode: ChatMode) -> SortPlan {
        match mode {
            ChatMode::Simple => SortPlan::parse(&self.simple),
            ChatMode::Smart => SortPlan::parse(&self.smart),
            ChatMode::Chat => SortPlan::parse(&self.chat),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Results returned in simple and smart mode.
    pub max_direct_results: usize,
    /// Tasks considered for an assistant in chat mode.
    pub max_tasks_for_ai: usize,
    /// Tasks recommended back in chat mode.
    pub max_recommendations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_direct_results: 20,
            max_tasks_for_ai: 100,
            max_recommendations: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub timezone: String,
    /// 0 = adaptive threshold, >0 = fixed minimum final score.
    pub quality_filter_strength: f64,
    pub priority_mapping: PriorityMapping,
    pub status_mapping: StatusMapping,
    pub stop_words: StopWordsConfig,
    pub sort: SortSection,
    pub limits: Limits,
    pub scoring: ScoringWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            quality_filter_strength: 0.0,
            priority_mapping: PriorityMapping::default(),
            status_mapping: StatusMapping::default(),
            stop_words: StopWordsConfig::default(),
            sort: SortSection::default(),
            limits: Limits::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.timezone)?;

        if !(self.quality_filter_strength >= 0.0 && self.quality_filter_strength.is_finite()) {
            return Err(Error::config("quality_filter_strength must be a non-negative number"));
        }
        let w = &self.scoring;
        if [w.relevance, w.due_date, w.priority, w.status]
            .iter()
            .any(|x| !(*x >= 0.0 && x.is_finite()))
        {
            return Err(Error::config("scoring weights must be non-negative numbers"));
        }
        for mode in [ChatMode::Simple, ChatMode::Smart, ChatMode::Chat] {
            if self.sort.plan(mode).is_empty() {
                return Err(Error::config(format!(
                    "sort plan for {mode:?} mode has no known criteria"
                )));
            }
        }
        let l = &self.limits;
        if l.max_direct_results == 0 || l.max_tasks_for_ai == 0 || l.max_recommendations == 0 {
            return Err(Error::config("limits must be greater than zero"));
        }
        if let Some(alias) = self.priority_mapping.duplicate_alias() {
            return Err(Error::config(format!(
                "priority alias '{alias}' is mapped to more than one level"
            )));
        }
        Ok(())
    }

    pub fn limit(&self, mode: ChatMode) -> usize {
        match mode {
            ChatMode::Simple | ChatMode::Smart => self.limits.max_direct_results,
            ChatMode::Chat => self.limits.max_recommendations,
        }
    }
}
