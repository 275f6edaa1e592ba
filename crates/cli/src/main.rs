//! Roadmap CLI - terminal dashboard for the 12-week learning roadmap.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use roadmap_core::{Catalog, Time};
use roadmap_progress::{current_week, export_file_name, Dashboard, ProgressStore};
use roadmap_storage::JsonStorage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(about = "Track progress through a 12-week learning roadmap", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding saved progress
    #[arg(short, long, default_value = ".roadmap", global = true)]
    data_dir: PathBuf,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall and per-week progress
    Status,
    /// List tasks with their state
    Show {
        /// Only this week
        week: Option<u32>,
    },
    /// Flip a task between done and pending
    Toggle {
        /// Week number
        week: u32,
        /// Task number within the week, starting at 1
        task: usize,
    },
    /// Mark a task done
    Done {
        /// Week number
        week: u32,
        /// Task number within the week, starting at 1
        task: usize,
    },
    /// Mark a task pending
    Undo {
        /// Week number
        week: u32,
        /// Task number within the week, starting at 1
        task: usize,
    },
    /// Change the display name
    Rename {
        /// New name
        name: String,
    },
    /// Show or replace the notes
    Notes {
        /// New notes; omit to print the current ones
        text: Option<String>,
    },
    /// Change the theme name
    Theme {
        /// Theme name
        theme: String,
    },
    /// Clear every task flag
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Write progress to a JSON file
    Export {
        /// Output path (defaults to a timestamped name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace progress with the contents of a JSON file
    Import {
        /// File produced by `export`
        file: PathBuf,
    },
    /// Show the weekly calendar
    Schedule,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Logs go to stderr so stdout carries only the dashboard.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    // Refuse before loading: a load may write healed defaults back.
    if let Commands::Reset { yes } = &cli.command {
        confirm_reset(*yes)?;
    }

    let storage = JsonStorage::new(&cli.data_dir)
        .await
        .with_context(|| format!("opening data directory {}", cli.data_dir.display()))?;
    let mut store = ProgressStore::load(storage, Catalog::roadmap()).await;

    match cli.command {
        Commands::Status => {
            print_status(&store.dashboard()?, store.catalog());
        }
        Commands::Show { week } => {
            if let Some(week) = week {
                if store.catalog().week(week).is_none() {
                    bail!("week {} is not in the roadmap", week);
                }
            }
            print_tasks(&store.dashboard()?, store.catalog(), week);
        }
        Commands::Toggle { week, task } => {
            let index = task_index(task)?;
            let state = store.toggle_task(week, index).await?;
            println!("Week {} task {}: {}", week, task, done_label(state.is_done(week, index)));
        }
        Commands::Done { week, task } => {
            let index = task_index(task)?;
            store.set_task(week, index, true).await?;
            println!("Week {} task {}: Done", week, task);
        }
        Commands::Undo { week, task } => {
            let index = task_index(task)?;
            store.set_task(week, index, false).await?;
            println!("Week {} task {}: Pending", week, task);
        }
        Commands::Rename { name } => {
            let state = store.rename(name).await?;
            println!("Name set to {:?}", state.name);
        }
        Commands::Notes { text } => match text {
            Some(text) => {
                store.set_notes(text).await?;
                println!("Notes saved");
            }
            None => println!("{}", store.state().notes),
        },
        Commands::Theme { theme } => {
            let state = store.set_theme(theme).await?;
            println!("Theme set to {}", state.theme);
        }
        Commands::Reset { .. } => {
            store.reset_all().await?;
            println!("All progress cleared");
        }
        Commands::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now())));
            let doc = store.export_document()?;
            tokio::fs::write(&path, doc)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "exported progress");
            println!("Exported to {}", path.display());
        }
        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let state = store.import_document(&raw).await?;
            println!("Imported progress for {}", state.name);
        }
        Commands::Schedule => {
            print_schedule(&store.dashboard()?, store.catalog());
        }
    }

    Ok(())
}

fn task_index(task: usize) -> Result<usize> {
    match task.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("task numbers start at 1"),
    }
}

fn confirm_reset(yes: bool) -> Result<()> {
    if !yes {
        bail!("reset clears every task; run again with --yes to confirm");
    }
    Ok(())
}

fn done_label(done: Option<bool>) -> &'static str {
    if done.unwrap_or(false) {
        "Done"
    } else {
        "Pending"
    }
}

fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = (usize::from(percent.min(100)) * WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(WIDTH - filled))
}

fn format_date(at: Time) -> String {
    at.format("%a %b %d %Y").to_string()
}

fn print_status(dash: &Dashboard, catalog: &Catalog) {
    let current = current_week(catalog, &dash.state, Utc::now()).ok().flatten();

    println!("{}'s learning dashboard", dash.state.name);
    println!("Overall {} {}%", progress_bar(dash.overall), dash.overall);
    println!();
    for week in &dash.weekly {
        let marker = if current == Some(week.week_number) { ">" } else { " " };
        println!(
            "{} Week {:>2} {} {:>3}%  {}",
            marker,
            week.week_number,
            progress_bar(week.percent_complete),
            week.percent_complete,
            week.title,
        );
    }
}

fn print_tasks(dash: &Dashboard, catalog: &Catalog, only: Option<u32>) {
    for (week, progress) in catalog.iter().zip(&dash.weekly) {
        if only.is_some_and(|n| n != week.week_number) {
            continue;
        }
        println!(
            "Week {}: {} ({}%, {} tasks)",
            week.week_number,
            week.title,
            progress.percent_complete,
            week.task_count()
        );
        for (i, task) in week.tasks.iter().enumerate() {
            let done = dash.state.is_done(week.week_number, i);
            let check = if done.unwrap_or(false) { "x" } else { " " };
            println!("  [{}] {}. {}  ({})", check, i + 1, task, done_label(done));
        }
        println!();
    }
}

fn print_schedule(dash: &Dashboard, catalog: &Catalog) {
    let start = dash
        .schedule
        .first()
        .map(|entry| format_date(entry.computed_start_date))
        .unwrap_or_default();
    println!(
        "Start: {}  Duration: {} weeks  Ends: {}",
        start,
        catalog.len(),
        format_date(dash.ends_at)
    );
    for entry in &dash.schedule {
        println!(
            "  Week {:>2}  {}  {}",
            entry.week_number,
            format_date(entry.computed_start_date),
            entry.title
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_index_is_one_based() {
        assert_eq!(task_index(1).unwrap(), 0);
        assert_eq!(task_index(5).unwrap(), 4);
        assert!(task_index(0).is_err());
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        assert_eq!(format_date(at), "Mon Mar 04 2024");
    }

    #[test]
    fn test_cli_parses() {
        let cli =
            Cli::try_parse_from(["roadmap", "--data-dir", "/tmp/x", "toggle", "3", "2"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/x"));
        assert!(matches!(cli.command, Commands::Toggle { week: 3, task: 2 }));

        let cli = Cli::try_parse_from(["roadmap", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let err = confirm_reset(false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert!(confirm_reset(true).is_ok());
    }

    #[tokio::test]
    async fn test_unconfirmed_reset_leaves_data_dir_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let cli = Cli::try_parse_from([
            "roadmap",
            "--data-dir",
            data_dir.to_str().unwrap(),
            "reset",
        ])
        .unwrap();

        assert!(run(cli).await.is_err());
        assert!(!data_dir.exists());
    }
}
