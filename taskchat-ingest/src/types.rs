use serde::{Deserialize, Serialize};

/// Where a note sits inside the vault and what it is tagged with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    /// Vault-relative path with `/` separators, e.g. `Work/Plans.md`.
    pub path: String,
    /// Vault-relative parent directory; `None` for notes at the root.
    pub folder: Option<String>,
    /// Front-matter tags, without a leading `#`.
    pub tags: Vec<String>,
}

impl NoteMeta {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let folder = path
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .filter(|d| !d.is_empty());
        Self {
            path,
            folder,
            tags: Vec::new(),
        }
    }
}

/// Counters from one vault scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub notes: usize,
    pub tasks: usize,
    /// Files that could not be read as UTF-8 text.
    pub unreadable: usize,
}
