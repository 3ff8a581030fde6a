//! # Lifelog Harness CLI (`llg`)
//!
//! The `llg` binary renders a lifelog archive served by a static file
//! host as a timeline in the terminal.
//!
//! ## Usage
//!
//! ```bash
//! llg --config ./config/llg.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `llg timeline` | Load a date range and render the grouped timeline |
//! | `llg index` | Discover and print the reachable file index |
//! | `llg probe` | Report which candidate base URL answers at all |
//!
//! ## Examples
//!
//! ```bash
//! # Last seven days
//! llg timeline --days 7
//!
//! # Explicit range with a text filter
//! llg timeline --start 2024-01-01 --end 2024-03-31 --filter "deploy"
//!
//! # Everything the listing knows about, one chunk at a time
//! llg timeline --all --pages 1
//!
//! # Render chunks until a given day is on screen
//! llg timeline --days 90 --jump 2024-02-14
//! ```

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lifelog_harness::config;
use lifelog_harness::date::{parse_date_input, quick_range, time_of};
use lifelog_harness::fetch::HttpFetcher;
use lifelog_harness::filter::FilterState;
use lifelog_harness::models::FileKey;
use lifelog_harness::render::{RenderItem, RenderPhase, TimelineRenderState};
use lifelog_harness::resolver::{probe_base, resolve};
use lifelog_harness::session::Session;
use lifelog_harness::status::StatusMode;

/// Lifelog Harness CLI — a read-only browser for a daily-JSONL lifelog
/// archive on a static file host.
#[derive(Parser)]
#[command(
    name = "llg",
    about = "Lifelog Harness — browse a daily-JSONL lifelog archive as a timeline",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/llg.toml")]
    config: PathBuf,

    /// Status output on stderr: `off`, `human`, or `json`.
    /// Defaults to `human` when stderr is a terminal, else `off`.
    #[arg(long, global = true)]
    status: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load log entries and render the grouped timeline.
    ///
    /// With no range options the configured default range is used
    /// (one year of history ending today, unless overridden).
    Timeline {
        /// Range start, inclusive (YYYY-MM-DD). Requires --end.
        #[arg(long)]
        start: Option<String>,

        /// Range end, inclusive (YYYY-MM-DD). Requires --start.
        #[arg(long)]
        end: Option<String>,

        /// Quick range: this many days back, ending today.
        #[arg(long, conflicts_with_all = ["start", "end"])]
        days: Option<u32>,

        /// Quick range: today only.
        #[arg(long, conflicts_with_all = ["start", "end", "days"])]
        today: bool,

        /// Ignore date ranges and load every file the listing knows.
        #[arg(long, conflicts_with_all = ["start", "end", "days", "today"])]
        all: bool,

        /// Case-insensitive text filter on entry descriptions.
        #[arg(long)]
        filter: Option<String>,

        /// Render only this many chunks instead of the whole timeline.
        #[arg(long)]
        pages: Option<usize>,

        /// Render chunks until this date's group is on screen (YYYY-MM-DD).
        #[arg(long, conflicts_with = "pages")]
        jump: Option<String>,
    },

    /// Discover the archive's file index and print it.
    Index,

    /// Report which candidate base URL is reachable.
    Probe {
        /// Day key to probe with (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let status_mode = match cli.status.as_deref() {
        None => StatusMode::default_for_tty(),
        Some("off") => StatusMode::Off,
        Some("human") => StatusMode::Human,
        Some("json") => StatusMode::Json,
        Some(other) => bail!("Unknown status mode: {}. Use off, human, or json.", other),
    };

    match cli.command {
        Commands::Timeline {
            start,
            end,
            days,
            today,
            all,
            filter,
            pages,
            jump,
        } => {
            let range = if all {
                None
            } else {
                Some(resolve_range(&cfg, start, end, days, today)?)
            };
            run_timeline(&cfg, status_mode, range, filter, pages, jump).await?;
        }
        Commands::Index => {
            run_index(&cfg).await?;
        }
        Commands::Probe { date } => {
            run_probe(&cfg, date).await?;
        }
    }

    Ok(())
}

/// Work out the inclusive date range for `timeline` from the CLI flags,
/// falling back to the configured default span ending today.
fn resolve_range(
    cfg: &config::Config,
    start: Option<String>,
    end: Option<String>,
    days: Option<u32>,
    today: bool,
) -> Result<(NaiveDate, NaiveDate)> {
    let now = Utc::now().date_naive();
    match (start, end) {
        (Some(s), Some(e)) => {
            let start = parse_date_input(&s)
                .with_context(|| format!("Invalid --start date: {}", s))?;
            let end =
                parse_date_input(&e).with_context(|| format!("Invalid --end date: {}", e))?;
            Ok((start, end))
        }
        (None, None) => {
            let span = if today {
                1
            } else {
                days.unwrap_or(cfg.filter.default_range_days)
            };
            Ok(quick_range(span, now))
        }
        _ => bail!("--start and --end must be given together"),
    }
}

async fn run_timeline(
    cfg: &config::Config,
    status_mode: StatusMode,
    range: Option<(NaiveDate, NaiveDate)>,
    text: Option<String>,
    pages: Option<usize>,
    jump: Option<String>,
) -> Result<()> {
    let fetcher = Box::new(HttpFetcher::new(cfg.load.timeout_secs));
    let mut session = Session::new(
        fetcher,
        status_mode.sink(),
        cfg.source.bases.clone(),
        cfg.load.batch_size,
    );

    let filter = FilterState {
        start: range.map(|(s, _)| s),
        end: range.map(|(_, e)| e),
        text: text.unwrap_or_default(),
    };

    session
        .ensure_loaded(&filter)
        .await
        .context("Failed to load lifelog")?;

    let entries = session.filtered(&filter);
    let mut state = TimelineRenderState::new(cfg.render.page_size);
    state.reset(entries);

    if state.phase() == RenderPhase::Empty {
        println!("No log entries found.");
        return Ok(());
    }

    if let Some(target) = jump {
        let day = parse_date_input(&target)
            .with_context(|| format!("Invalid --jump date: {}", target))?;
        let found = state.ensure_rendered(&day.format("%Y-%m-%d").to_string());
        print_items(state.output());
        if !found {
            println!();
            println!("({} is not in the filtered timeline)", day);
        }
    } else {
        let mut remaining = pages;
        while state.phase() == RenderPhase::Partial {
            if let Some(n) = remaining.as_mut() {
                if *n == 0 {
                    break;
                }
                *n -= 1;
            }
            let chunk: Vec<RenderItem> = state.render_next_chunk().to_vec();
            print_items(&chunk);
        }
    }

    println!();
    println!(
        "rendered {} of {} entries ({} raw lines, {} malformed)",
        state.rendered(),
        session.filtered(&filter).len(),
        session.raw_count(),
        session.malformed_count()
    );
    Ok(())
}

async fn run_index(cfg: &config::Config) -> Result<()> {
    let fetcher = HttpFetcher::new(cfg.load.timeout_secs);
    let index = resolve(&fetcher, &cfg.source.bases)
        .await
        .context("Cannot list lifelog files")?;
    println!("base: {}", index.base);
    for file in &index.files {
        println!("  {}", file);
    }
    println!("{} files", index.files.len());
    Ok(())
}

async fn run_probe(cfg: &config::Config, date: Option<String>) -> Result<()> {
    let day = match date {
        Some(d) => parse_date_input(&d).with_context(|| format!("Invalid --date: {}", d))?,
        None => Utc::now().date_naive(),
    };
    let sample = FileKey::from_date(day);
    let fetcher = HttpFetcher::new(cfg.load.timeout_secs);
    let base = probe_base(&fetcher, &cfg.source.bases, &sample).await;
    println!("reachable base: {}", base);
    Ok(())
}

/// Print a slice of the render stream as indented terminal lines.
fn print_items(items: &[RenderItem]) {
    for item in items {
        match item {
            RenderItem::GroupBreak(day) => {
                println!();
                println!("{}", day);
            }
            RenderItem::Entry(entry) => {
                let time = entry
                    .timestamp
                    .as_deref()
                    .and_then(time_of)
                    .unwrap_or_else(|| "     ".to_string());
                println!(
                    "  {}  {:<9}  {:<6}  {}",
                    time,
                    entry.status.as_str(),
                    entry.module.as_str(),
                    entry.description
                );
                if !entry.related_files.is_empty() {
                    println!("           files: {}", entry.related_files.join(", "));
                }
            }
        }
    }
}
