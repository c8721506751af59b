use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use taskchat_core::time::local_today;
use taskchat_core::{
    due_filter_range, filter_tasks, ChatMode, DateRange, ParsedQuery, ScoredTask, SearchOutcome,
    PriorityMapping, SearchPipeline, SearchRequest, SortPlan, Task, TaskFilter,
};
use taskchat_ingest::VaultScanner;

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "taskchat",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TASKCHAT_BUILD_SHA"), ")"),
    about = "Ask questions about the tasks in your Markdown notes"
)]
struct Cli {
    /// Log pipeline stages to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search tasks with a free-form query
    Search {
        /// Query text, e.g. "urgent taxes due this week"
        #[arg(required_unless_present = "intent_json")]
        query: Vec<String>,

        /// Read a parsed query (JSON, `{"source": "ai", "result": {...}}`). When query
        /// text is also given, a rejected parse falls back to extracting from the text.
        #[arg(long)]
        intent_json: Option<PathBuf>,

        #[command(flatten)]
        vault: VaultArgs,

        #[arg(long, value_enum, default_value_t = ModeArg::Simple)]
        mode: ModeArg,

        /// Override the mode's result limit
        #[arg(long)]
        limit: Option<usize>,

        /// Comma-separated sort plan, e.g. "dueDate,priority"
        #[arg(long)]
        sort: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the intent extracted from a query as JSON
    Parse {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// List tasks from the vault through a manual filter only
    Tasks {
        #[command(flatten)]
        vault: VaultArgs,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long)]
        json: bool,
    },

    /// Manage ~/.taskchat/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init {
        /// Default vault to record in the config
        #[arg(long)]
        vault: Option<PathBuf>,
    },
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

#[derive(clap::Args, Debug)]
struct VaultArgs {
    /// Vault root (defaults to [vault].path from the config)
    #[arg(long)]
    vault: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Folder prefix (repeatable)
    #[arg(long = "folder")]
    folders: Vec<String>,
    /// Task or note tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Note-level tag only (repeatable)
    #[arg(long = "note-tag")]
    note_tags: Vec<String>,
    /// Priority 1-4 or "none" (repeatable)
    #[arg(long = "priority")]
    priorities: Vec<String>,
    /// Status code or checkbox symbol (repeatable)
    #[arg(long = "status")]
    statuses: Vec<String>,
    /// Relative due token: today, tomorrow, overdue, this week, next week, future, +Nd, -Nd
    #[arg(long, conflicts_with_all = ["due_from", "due_to"])]
    due: Option<String>,
    /// Earliest due date (ISO or relative)
    #[arg(long)]
    due_from: Option<String>,
    /// Latest due date (ISO or relative)
    #[arg(long)]
    due_to: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    Simple,
    Smart,
    Chat,
}

impl From<ModeArg> for ChatMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Simple => ChatMode::Simple,
            ModeArg::Smart => ChatMode::Smart,
            ModeArg::Chat => ChatMode::Chat,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Search {
            query,
            intent_json,
            vault,
            mode,
            limit,
            sort,
            filter,
            json,
        } => {
            let cfg = config::load_config()?;
            let mut tasks = load_tasks(&cfg, vault.vault)?;
            let pipeline = SearchPipeline::new(cfg.search.clone())?;
            let now = Utc::now();
            let today = local_today(now, &cfg.search.timezone)?;

            let mut request = match intent_json {
                Some(path) => {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("read {}", path.display()))?;
                    let parsed: ParsedQuery = serde_json::from_str(&raw)
                        .with_context(|| format!("parse {}", path.display()))?;
                    if query.is_empty() {
                        SearchRequest::parsed(parsed)
                    } else {
                        SearchRequest::parsed_or_text(parsed, query.join(" "))
                    }
                }
                None => SearchRequest::text(query.join(" ")),
            }
            .with_mode(mode.into());

            let manual = filter.into_filter(today, &cfg.search.priority_mapping)?;
            if !manual.is_empty() {
                request = request.with_filter(manual);
            }
            if let Some(sort) = sort {
                let plan = SortPlan::parse(&sort.split(',').collect::<Vec<_>>());
                if plan.is_empty() {
                    bail!("--sort has no known criteria: {sort}");
                }
                request = request.with_sort(plan);
            }
            if let Some(limit) = limit {
                request = request.with_limit(limit);
            }

            let outcome = pipeline.run(request, &mut tasks, now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, &pipeline.config().priority_mapping);
            }
        }

        Command::Parse { query } => {
            let cfg = config::load_config()?;
            let pipeline = SearchPipeline::new(cfg.search)?;
            let intent = pipeline.extract(&query.join(" "));
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }

        Command::Tasks {
            vault,
            filter,
            json,
        } => {
            let cfg = config::load_config()?;
            let tasks = load_tasks(&cfg, vault.vault)?;
            let today = local_today(Utc::now(), &cfg.search.timezone)?;
            let manual = filter.into_filter(today, &cfg.search.priority_mapping)?;
            let selected = filter_tasks(&tasks, &manual, today);
            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                for t in &selected {
                    println!("{}", task_line(t, &cfg.search.priority_mapping));
                }
                println!("\n{} of {} tasks", selected.len(), tasks.len());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init { vault } => config::init_config(vault)?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_tasks(cfg: &Config, vault: Option<PathBuf>) -> Result<Vec<Task>> {
    let Some(root) = vault.or_else(|| cfg.vault.path.clone()) else {
        bail!("no vault given. Pass --vault <dir> or run: taskchat config init --vault <dir>");
    };
    if !root.is_dir() {
        bail!("vault not found: {}", root.display());
    }
    let scanner = VaultScanner::new(root, &cfg.search)?;
    let (tasks, stats) = scanner.scan()?;
    if stats.unreadable > 0 {
        warn!(skipped = stats.unreadable, "some notes were not valid UTF-8");
    }
    Ok(tasks)
}

impl FilterArgs {
    fn into_filter(self, today: chrono::NaiveDate, mapping: &PriorityMapping) -> Result<TaskFilter> {
        let priorities = self
            .priorities
            .iter()
            .map(|p| priority_filter_code(p, mapping))
            .collect::<Result<Vec<_>>>()?;
        let due_date_range = match (self.due, self.due_from, self.due_to) {
            (Some(token), _, _) => Some(
                due_filter_range(&token, today)
                    .with_context(|| format!("unknown --due token: {token}"))?,
            ),
            (None, None, None) => None,
            (None, start, end) => Some(DateRange::Bounds { start, end }),
        };
        Ok(TaskFilter {
            folders: self.folders,
            note_tags: self.note_tags,
            tags: self.tags,
            priorities,
            due_date_range,
            task_statuses: self.statuses,
            ..Default::default()
        })
    }
}

/// `--priority` value as a filter code: a level, an alias of one, or "none".
fn priority_filter_code(raw: &str, mapping: &PriorityMapping) -> Result<String> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("none") || value == "0" {
        return Ok("none".to_string());
    }
    if let Ok(level @ 1..=4) = value.parse::<u8>() {
        return Ok(level.to_string());
    }
    match mapping.resolve(value) {
        0 => bail!("unknown --priority value: {raw} (use 1-4, a configured alias, or none)"),
        level => Ok(level.to_string()),
    }
}

fn task_line(t: &Task, priorities: &PriorityMapping) -> String {
    let mut line = format!("[{}] {}", t.status, t.text);
    if let Some(due) = t.due_date {
        line.push_str(&format!("  due {due}"));
    }
    if let Some(label) = priorities.label(t.priority) {
        line.push_str(&format!("  {label}"));
    }
    line.push_str(&format!("  ({}:{})", t.source_path, t.line_number));
    line
}

fn print_outcome(outcome: &SearchOutcome, priorities: &PriorityMapping) {
    let shown: &[ScoredTask] = match outcome.mode {
        ChatMode::Chat => outcome.recommended(),
        _ => &outcome.results,
    };
    if shown.is_empty() {
        println!("No matching tasks.");
    }
    for (i, st) in shown.iter().enumerate() {
        println!(
            "{:>2}. {}  score={:.2}",
            i + 1,
            task_line(&st.task, priorities),
            st.scores.final_score
        );
    }
    let c = &outcome.counts;
    println!(
        "\n{} shown | {} matched filters | {} after quality cut | {} scanned | sort: {}",
        shown.len(),
        c.filtered,
        c.qualified,
        c.total,
        outcome
            .sort_plan
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 19).unwrap()
    }

    #[test]
    fn test_priority_flags_resolve_through_aliases() {
        let mapping = PriorityMapping::default();
        let args = FilterArgs {
            priorities: vec!["high".into(), "3".into(), "None".into()],
            ..Default::default()
        };
        let filter = args.into_filter(today(), &mapping).unwrap();
        assert_eq!(filter.priorities, vec!["1", "3", "none"]);

        let args = FilterArgs {
            priorities: vec!["sometime".into()],
            ..Default::default()
        };
        assert!(args.into_filter(today(), &mapping).is_err());
    }

    #[test]
    fn test_due_flags_become_ranges() {
        let mapping = PriorityMapping::default();
        let args = FilterArgs {
            due: Some("today".into()),
            ..Default::default()
        };
        let filter = args.into_filter(today(), &mapping).unwrap();
        assert_eq!(
            filter.due_date_range,
            Some(DateRange::Bounds {
                start: Some("2026-02-19".into()),
                end: Some("2026-02-19".into()),
            })
        );

        let args = FilterArgs {
            due: Some("someday".into()),
            ..Default::default()
        };
        assert!(args.into_filter(today(), &mapping).is_err());
    }

    #[test]
    fn test_task_line_uses_priority_label() {
        let mut mapping = PriorityMapping::default();
        mapping.p2 = vec!["2".into(), "important".into()];
        let task = Task::new("Inbox.md:3", "Call dentist")
            .with_source("Inbox.md", 3)
            .with_priority(2);
        assert_eq!(
            task_line(&task, &mapping),
            "[ ] Call dentist  important  (Inbox.md:3)"
        );
    }
}
