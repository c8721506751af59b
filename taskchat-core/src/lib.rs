//! taskchat-core: Query understanding and ranking over note-embedded tasks

pub mod config;
pub mod date_range;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod intent;
pub mod mapping;
pub mod parsed;
pub mod ranking;
pub mod scoring;
pub mod search;
pub mod stop_words;
pub mod task;
pub mod time;

pub use config::{ChatMode, Limits, SearchConfig, SortSection};
pub use date_range::{due_filter_range, DateInterval, DateOperator, DateRange};
pub use error::{Error, Result};
pub use extractor::IntentExtractor;
pub use filter::{filter_tasks, CompiledFilter, TaskFilter};
pub use intent::{DueDateIntent, OneOrMany, QueryIntent};
pub use mapping::{priority_from_emoji, PriorityMapping, StatusAliases, StatusMapping};
pub use parsed::{AiParsedQuery, ParsedQuery};
pub use ranking::{rank, SortCriterion, SortPlan};
pub use scoring::{score, ScoreComponents, ScoredTask, ScoringContext, ScoringWeights};
pub use search::{QueryInput, SearchOutcome, SearchPipeline, SearchRequest, StageCounts};
pub use stop_words::{StopWords, StopWordsConfig};
pub use task::{StatusCategory, Task};
