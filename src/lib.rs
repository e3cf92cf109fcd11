pub mod capture;
pub mod db;
pub mod ingest;
pub mod normalize;
pub mod settings;
pub mod snapshot;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use capture::{capture_snapshot, SystemQueries};
use db::Database;
use ingest::{ingest_files, IngestOptions};
use settings::SettingsStore;

#[derive(Parser)]
#[command(author, version, about = "Record what you do and save it to SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one snapshot of the current desktop as a JSON line.
    Capture {
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Save snapshot logs to a SQLite database.
    Ingest {
        db_path: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Move on to the next file after a malformed line.
        #[arg(long)]
        keep_going: bool,
        #[arg(long)]
        no_progress: bool,
    },
    /// Summarise an ingested database.
    Stats {
        db_path: PathBuf,
        /// Print the summary as one JSON object.
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run_capture(settings_path: Option<PathBuf>) -> Result<()> {
    let store = SettingsStore::load(settings_path.unwrap_or_else(SettingsStore::default_path))?;
    let settings = store.capture();
    let snapshot = capture_snapshot(&SystemQueries::new(settings), settings)?;

    let line = serde_json::to_string(&snapshot).context("failed to serialize snapshot")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}").context("failed to write snapshot")?;
    Ok(())
}

fn run_ingest(
    db_path: PathBuf,
    files: Vec<PathBuf>,
    keep_going: bool,
    no_progress: bool,
) -> Result<()> {
    let mut db = Database::open(db_path)?;
    let options = IngestOptions {
        keep_going,
        show_progress: !no_progress && io::stderr().is_terminal(),
    };

    let stats = ingest_files(&mut db, &files, &options)?;
    if stats.failed_files > 0 {
        bail!("{} of {} files had malformed lines", stats.failed_files, files.len());
    }
    Ok(())
}

fn run_stats(db_path: PathBuf, json: bool) -> Result<()> {
    if !db_path.exists() {
        bail!("no database at {}", db_path.display());
    }
    let summary = Database::open(db_path)?.summary()?;

    if json {
        let line = serde_json::to_string(&summary).context("failed to serialize summary")?;
        println!("{line}");
        return Ok(());
    }

    println!("records: {}", summary.records);
    println!("screens: {}", summary.screens);
    println!();
    println!("by category:");
    for row in &summary.categories {
        println!(
            "  {:<16} {}",
            row.category.as_deref().unwrap_or("(none)"),
            row.count
        );
    }
    println!();
    println!("by focused screen:");
    for row in &summary.focus_screens {
        println!("  #{:<3} {:<20} {}", row.screen_id, row.name, row.count);
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match cli.command {
        Commands::Capture { settings } => run_capture(settings),
        Commands::Ingest {
            db_path,
            files,
            keep_going,
            no_progress,
        } => run_ingest(db_path, files, keep_going, no_progress),
        Commands::Stats { db_path, json } => run_stats(db_path, json),
    }
}
