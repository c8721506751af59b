//! Stop-word filter: low-signal words removed before keyword extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Base English list plus filler that shows up in task queries.
pub const BASE_STOP_WORDS: &[&str] = &[
    // articles, conjunctions, prepositions
    "a", "an", "the", "and", "or", "but", "nor", "so", "of", "in", "on", "at", "to", "for",
    "with", "about", "from", "by", "into", "onto", "over", "under", "up", "down", "out", "as",
    // pronouns
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "we", "us", "our", "ours", "they",
    "them", "their", "he", "she", "it", "its", "this", "that", "these", "those",
    // auxiliaries
    "is", "are", "was", "were", "be", "been", "being", "am", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "can", "may", "might", "must", "shall",
    // question words
    "what", "which", "who", "whom", "when", "where", "why", "how",
    // query filler
    "show", "find", "list", "get", "give", "tell", "please", "all", "any", "some", "next",
    "task", "tasks", "todo", "todos", "item", "items", "need", "needs", "want",
    "there", "here", "then", "than", "just", "also", "now", "due", "status", "priority",
];

/// Configurable part of the stop-word list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopWordsConfig {
    /// User additions.
    pub extra: Vec<String>,
    /// Discard the base list and use only `extra`.
    pub replace_base: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new(config: &StopWordsConfig) -> Self {
        let mut words: HashSet<String> = HashSet::new();
        if !config.replace_base {
            words.extend(BASE_STOP_WORDS.iter().map(|w| w.to_string()));
        }
        words.extend(
            config
                .extra
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        Self { words }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Drop stop words from an already-tokenized list, preserving order.
    pub fn filter<'a, I>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens
            .into_iter()
            .filter(|t| !t.is_empty() && !self.is_stop_word(t))
            .map(|t| t.to_lowercase())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(&StopWordsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_words_case_insensitively() {
        let sw = StopWords::default();
        let out = sw.filter(["What", "should", "I", "do", "Budget", "review"]);
        assert_eq!(out, vec!["budget".to_string(), "review".to_string()]);
    }

    #[test]
    fn user_additions_extend_the_base_list() {
        let sw = StopWords::new(&StopWordsConfig {
            extra: vec![" Obsidian ".to_string()],
            replace_base: false,
        });
        assert!(sw.is_stop_word("obsidian"));
        assert!(sw.is_stop_word("the"));
    }

    #[test]
    fn replace_base_keeps_only_extras() {
        let sw = StopWords::new(&StopWordsConfig {
            extra: vec!["meh".to_string()],
            replace_base: true,
        });
        assert_eq!(sw.len(), 1);
        assert!(!sw.is_stop_word("the"));
    }
}
