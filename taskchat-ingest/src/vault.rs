//! Vault traversal: every `.md` note under a root, in sorted path order.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use taskchat_core::{SearchConfig, Task};

use crate::parsers::{parse_front_matter, MarkdownTaskParser};
use crate::types::{NoteMeta, ScanStats};

pub struct VaultScanner {
    root: PathBuf,
    parser: MarkdownTaskParser,
}

impl VaultScanner {
    pub fn new(root: impl Into<PathBuf>, config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            parser: MarkdownTaskParser::new(config)?,
        })
    }

    /// Vault-relative paths of all notes, sorted. Hidden entries are skipped.
    pub fn note_paths(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            let entry = entry.with_context(|| format!("walking {}", self.root.display()))?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            if let Some(rel) = relative_slash_path(&self.root, entry.path()) {
                out.push(rel);
            }
        }
        // File-name order within each directory is not full-path order.
        out.sort();
        Ok(out)
    }

    /// Parse one note given its vault-relative path and content.
    pub fn parse_note(&self, rel_path: &str, content: &str) -> Vec<Task> {
        let (tags, skip) = parse_front_matter(content);
        let meta = NoteMeta {
            tags,
            ..NoteMeta::new(rel_path)
        };
        self.parser.parse_note(content, &meta, skip)
    }

    pub fn scan(&self) -> Result<(Vec<Task>, ScanStats)> {
        let mut stats = ScanStats::default();
        let mut tasks = Vec::new();

        for rel in self.note_paths()? {
            let path = self.root.join(&rel);
            let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let Ok(content) = String::from_utf8(bytes) else {
                warn!(path = %rel, "skipping note that is not valid UTF-8");
                stats.unreadable += 1;
                continue;
            };
            let found = self.parse_note(&rel, &content);
            debug!(path = %rel, tasks = found.len(), "parsed note");
            stats.notes += 1;
            tasks.extend(found);
        }
        stats.tasks = tasks.len();
        info!(
            root = %self.root.display(),
            notes = stats.notes,
            tasks = stats.tasks,
            "scanned vault"
        );
        Ok((tasks, stats))
    }
}

/// Scan `root` with the mappings from `config`.
pub fn scan_vault(root: impl AsRef<Path>, config: &SearchConfig) -> Result<Vec<Task>> {
    let root = root.as_ref();
    if !root.is_dir() {
        anyhow::bail!("vault path is not a directory: {}", root.display());
    }
    let (tasks, _) = VaultScanner::new(root, config)?.scan()?;
    Ok(tasks)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
