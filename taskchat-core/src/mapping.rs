//! Priority and status alias resolution.
//!
//! Both mappings are user-configurable alias lists keyed by a fixed code.
//! Resolution is case-insensitive and first-match-wins in key order; unmapped
//! strings resolve to "no value" instead of failing.

use serde::{Deserialize, Serialize};

use crate::task::StatusCategory;

/// Priority levels 1..=4 mapped to alias lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityMapping {
    #[serde(rename = "1", default)]
    pub p1: Vec<String>,
    #[serde(rename = "2", default)]
    pub p2: Vec<String>,
    #[serde(rename = "3", default)]
    pub p3: Vec<String>,
    #[serde(rename = "4", default)]
    pub p4: Vec<String>,
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Default for PriorityMapping {
    fn default() -> Self {
        Self {
            p1: strings(&["1", "p1", "high", "highest", "urgent"]),
            p2: strings(&["2", "p2", "medium", "med"]),
            p3: strings(&["3", "p3", "low"]),
            p4: strings(&["4", "p4", "lowest"]),
        }
    }
}

impl PriorityMapping {
    /// Aliases for a level; empty for anything outside 1..=4.
    pub fn aliases(&self, level: u8) -> &[String] {
        match level {
            1 => &self.p1,
            2 => &self.p2,
            3 => &self.p3,
            4 => &self.p4,
            _ => &[],
        }
    }

    /// Resolve an alias to a level, 0 when unmapped.
    pub fn resolve(&self, alias: &str) -> u8 {
        let a = alias.trim();
        if a.is_empty() {
            return 0;
        }
        (1..=4u8)
            .find(|&level| self.aliases(level).iter().any(|x| x.trim().eq_ignore_ascii_case(a)))
            .unwrap_or(0)
    }

    /// Human label for a level: the first non-numeric alias, else the digit.
    pub fn label(&self, level: u8) -> Option<String> {
        if !(1..=4).contains(&level) {
            return None;
        }
        let label = self
            .aliases(level)
            .iter()
            .find(|a| !a.chars().all(|c| c.is_ascii_digit()))
            .cloned()
            .unwrap_or_else(|| level.to_string());
        Some(label)
    }

    /// All (alias, level) pairs, longest alias first so multi-word aliases win.
    pub fn alias_table(&self) -> Vec<(String, u8)> {
        let mut out: Vec<(String, u8)> = (1..=4u8)
            .flat_map(|level| {
                self.aliases(level)
                    .iter()
                    .map(move |a| (a.trim().to_lowercase(), level))
            })
            .filter(|(a, _)| !a.is_empty())
            .collect();
        out.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        out
    }

    /// First alias that appears under two levels, if any.
    pub fn duplicate_alias(&self) -> Option<String> {
        let table = self.alias_table();
        for (i, (alias, level)) in table.iter().enumerate() {
            if table[i + 1..].iter().any(|(a, l)| a == alias && l != level) {
                return Some(alias.clone());
            }
        }
        None
    }
}

/// Priority markers used by the Tasks emoji format.
pub fn priority_from_emoji(marker: &str) -> u8 {
    match marker {
        "🔺" | "⏫" => 1,
        "🔼" => 2,
        "🔽" => 3,
        "⏬" => 4,
        _ => 0,
    }
}

/// Aliases and checkbox symbols for one status category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusAliases {
    pub aliases: Vec<String>,
    pub symbols: Vec<String>,
}

impl StatusAliases {
    fn new(aliases: &[&str], symbols: &[&str]) -> Self {
        Self {
            aliases: strings(aliases),
            symbols: strings(symbols),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusMapping {
    pub open: StatusAliases,
    pub in_progress: StatusAliases,
    pub completed: StatusAliases,
    pub cancelled: StatusAliases,
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self {
            open: StatusAliases::new(
                &["open", "todo", "to do", "pending", "incomplete", "unfinished", "not started"],
                &[" ", ""],
            ),
            in_progress: StatusAliases::new(
                &["in progress", "in-progress", "inprogress", "doing", "started", "wip", "ongoing", "active"],
                &["/"],
            ),
            completed: StatusAliases::new(
                &["completed", "complete", "done", "finished", "closed"],
                &["x", "X"],
            ),
            cancelled: StatusAliases::new(
                &["cancelled", "canceled", "abandoned", "dropped", "wontdo", "won't do"],
                &["-"],
            ),
        }
    }
}

impl StatusMapping {
    fn entries(&self) -> [(StatusCategory, &StatusAliases); 4] {
        [
            (StatusCategory::Open, &self.open),
            (StatusCategory::InProgress, &self.in_progress),
            (StatusCategory::Completed, &self.completed),
            (StatusCategory::Cancelled, &self.cancelled),
        ]
    }

    /// Resolve a free-text alias (or a category code) to a category.
    pub fn resolve_alias(&self, alias: &str) -> Option<StatusCategory> {
        let a = alias.trim();
        if a.is_empty() {
            return None;
        }
        if let Some(c) = StatusCategory::from_code(a) {
            return Some(c);
        }
        self.entries()
            .into_iter()
            .find(|(_, e)| e.aliases.iter().any(|x| x.trim().eq_ignore_ascii_case(a)))
            .map(|(c, _)| c)
    }

    /// Resolve a checkbox symbol. Unknown symbols are `Other`.
    pub fn resolve_symbol(&self, symbol: &str) -> StatusCategory {
        self.entries()
            .into_iter()
            .find(|(_, e)| e.symbols.iter().any(|s| s == symbol))
            .map(|(c, _)| c)
            .unwrap_or(StatusCategory::Other)
    }

    /// All (alias, category) pairs, longest alias first.
    pub fn alias_table(&self) -> Vec<(String, StatusCategory)> {
        let mut out: Vec<(String, StatusCategory)> = self
            .entries()
            .into_iter()
            .flat_map(|(c, e)| e.aliases.iter().map(move |a| (a.trim().to_lowercase(), c)))
            .filter(|(a, _)| !a.is_empty())
            .collect();
        out.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        out
    }
}
