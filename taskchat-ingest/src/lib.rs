//! taskchat-ingest: task provider that scans a Markdown vault into `Task` records.

pub mod parsers;
pub mod types;
pub mod vault;

pub use types::{NoteMeta, ScanStats};
pub use vault::{scan_vault, VaultScanner};
