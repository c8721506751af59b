use chrono::{NaiveDate, TimeZone, Utc};
use std::path::PathBuf;
use taskchat_core::{SearchConfig, SearchPipeline, SearchRequest, StatusCategory};
use taskchat_ingest::{scan_vault, VaultScanner};

fn vault_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join("vault")
}

#[test]
fn test_scan_reads_markdown_in_sorted_order() {
    let scanner = VaultScanner::new(vault_path(), &SearchConfig::default()).unwrap();
    let (tasks, stats) = scanner.scan().unwrap();

    assert_eq!(stats.notes, 4);
    assert_eq!(stats.tasks, 9);
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "Home/Chores.md:1",
            "Home/Chores.md:2",
            "Inbox.md:3",
            "Inbox.md:4",
            "Work/Plans.md:10",
            "Work/Plans.md:11",
            "Work/Plans.md:12",
            "Work/Projects/Alpha.md:4",
            "Work/Projects/Alpha.md:5",
        ]
    );
}

#[test]
fn test_walk_skips_hidden_and_non_markdown_files() {
    let scanner = VaultScanner::new(vault_path(), &SearchConfig::default()).unwrap();
    assert_eq!(
        scanner.note_paths().unwrap(),
        vec![
            "Home/Chores.md",
            "Inbox.md",
            "Work/Plans.md",
            "Work/Projects/Alpha.md",
        ]
    );
}

#[test]
fn test_fields_and_tags_come_through() {
    let tasks = scan_vault(vault_path(), &SearchConfig::default()).unwrap();
    let by_id = |id: &str| tasks.iter().find(|t| t.id == id).unwrap();

    let dentist = by_id("Inbox.md:3");
    assert_eq!(dentist.priority, 1);
    assert_eq!(dentist.folder, None);

    let budget = by_id("Work/Plans.md:10");
    assert_eq!(budget.priority, 3);
    assert_eq!(budget.due_date, NaiveDate::from_ymd_opt(2026, 2, 23));
    assert_eq!(budget.tags, vec!["finance"]);
    assert_eq!(budget.note_tags, vec!["work", "planning"]);

    let shipped = by_id("Work/Plans.md:12");
    assert_eq!(shipped.status_category, StatusCategory::Completed);
    assert_eq!(shipped.completed_date, NaiveDate::from_ymd_opt(2026, 2, 10));

    let taxes = by_id("Work/Projects/Alpha.md:4");
    assert_eq!(taxes.folder.as_deref(), Some("Work/Projects"));
    assert_eq!(taxes.note_tags, vec!["work/alpha"]);

    assert_eq!(by_id("Home/Chores.md:2").status_category, StatusCategory::Other);
    assert!(tasks.iter().all(|t| !t.text.contains("ignored")));
}

#[test]
fn test_search_over_fixture_vault() {
    let config = SearchConfig::default();
    let mut tasks = scan_vault(vault_path(), &config).unwrap();
    let pipeline = SearchPipeline::new(config).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap();

    let urgent = pipeline.run(SearchRequest::text("urgent"), &mut tasks, now).unwrap();
    let ids: Vec<&str> = urgent.results.iter().map(|t| t.task.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["Work/Projects/Alpha.md:4", "Work/Plans.md:11", "Inbox.md:3"]
    );

    // Nested note tags match their parent.
    let work = pipeline.run(SearchRequest::text("#work"), &mut tasks, now).unwrap();
    assert_eq!(work.counts.filtered, 5);

    let alpha = pipeline
        .run(SearchRequest::text("in Work/Projects"), &mut tasks, now)
        .unwrap();
    assert_eq!(alpha.counts.filtered, 2);
}

#[test]
fn test_missing_vault_is_an_error() {
    let missing = vault_path().join("does-not-exist");
    assert!(scan_vault(missing, &SearchConfig::default()).is_err());
}
