//! Snapshot log ingestion.
//!
//! Files are processed in the order given, one record at a time. Each file
//! is written in its own transaction; re-running over the same logs only
//! rewrites rows keyed by the same timestamps.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rusqlite::Connection;

use crate::db::{
    helpers::{blank_to_none, parse_timestamp, position_or_unknown, to_count},
    ActivityLogRepository, ActivityRecord, Database, NormalizedScreen, ScreenRepository,
};
use crate::normalize::{normalize_activity, resolve_focus_screen};
use crate::snapshot::{RawSnapshot, SnapshotReader};

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Continue with the next file after a malformed line.
    pub keep_going: bool,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files: usize,
    pub failed_files: usize,
    pub records: usize,
    pub skipped: usize,
    pub warnings: usize,
}

/// A record ready to store, still holding its screen geometry rather than a
/// catalog id.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRecord {
    pub record: ActivityRecord,
    pub screen: NormalizedScreen,
    pub warnings: Vec<String>,
}

/// Builds the stored form of a snapshot.
///
/// Fails only when a field cannot be coerced to its stored type. Title and
/// motd parsing problems are reported as warnings instead.
pub fn assemble_record(snapshot: &RawSnapshot) -> Result<AssembledRecord> {
    let ts = parse_timestamp(&snapshot.ts, "ts")?;
    let activity = normalize_activity(&snapshot.title, snapshot.command(), snapshot.motd());
    let screen = resolve_focus_screen(snapshot)?;
    let locked = snapshot
        .locked_hint()
        .ok_or_else(|| anyhow!("snapshot has no LockedHint"))?;

    let record = ActivityRecord {
        ts,
        window_title: snapshot.title.clone(),
        command: activity.command,
        thing: activity.thing,
        motd: snapshot.motd().map(str::to_string),
        category: activity.category.map(|c| c.as_str().to_string()),
        active_task: activity.active_task,
        desktop: position_or_unknown(snapshot.desktop.as_ref(), "desktop")?,
        mouse_x: position_or_unknown(snapshot.mouse.x.as_ref(), "mouse.x")?,
        mouse_y: position_or_unknown(snapshot.mouse.y.as_ref(), "mouse.y")?,
        nscreens: to_count(snapshot.screens.len(), "nscreens")?,
        focus_screen: None,
        locked,
        music_playing: snapshot.music.playing,
        music_app: snapshot.music.app.clone(),
        music_playback: blank_to_none(&snapshot.music.playback),
        music_extra: snapshot.music.extra.clone(),
    };

    Ok(AssembledRecord {
        record,
        screen,
        warnings: activity.warnings,
    })
}

/// Resolves the screen through the catalog and upserts the row.
pub fn write_record(conn: &Connection, assembled: AssembledRecord) -> Result<ActivityRecord> {
    let mut record = assembled.record;
    record.focus_screen = Some(ScreenRepository::new(conn).get_or_create(&assembled.screen)?);
    ActivityLogRepository::new(conn).upsert(&record)?;
    Ok(record)
}

pub fn ingest_files(
    db: &mut Database,
    files: &[PathBuf],
    options: &IngestOptions,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();

    for path in files {
        if let Err(err) = ingest_file(db, path, options, &mut stats) {
            if !options.keep_going {
                return Err(err);
            }
            error!("{err:#}");
            stats.failed_files += 1;
        }
    }

    db.activity_log().rebuild_indexes()?;

    info!(
        "Ingested {} records from {} files ({} skipped, {} warnings, {} files failed)",
        stats.records, stats.files, stats.skipped, stats.warnings, stats.failed_files
    );

    Ok(stats)
}

fn ingest_file(
    db: &mut Database,
    path: &Path,
    options: &IngestOptions,
    stats: &mut IngestStats,
) -> Result<()> {
    let total_bytes = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    let mut reader = SnapshotReader::open(path)?;
    let progress = progress_bar(path, total_bytes, options.show_progress);

    let tx = db.transaction()?;
    let mut records = 0usize;
    let mut failure = None;

    while let Some(item) = reader.next() {
        progress.set_position(reader.bytes_consumed());

        let line = match item {
            Ok(line) => line,
            Err(err) => {
                failure = Some(err);
                break;
            }
        };

        match assemble_record(&line.snapshot) {
            Ok(assembled) => {
                stats.warnings += assembled.warnings.len();
                write_record(&tx, assembled)?;
                records += 1;
            }
            Err(err) => {
                error!(
                    "insert failed at {}:{}: {err:#}\nrow:\n{}",
                    path.display(),
                    line.line_no,
                    line.raw
                );
                stats.skipped += 1;
            }
        }
    }

    // Rows before a malformed line are kept.
    tx.commit()
        .with_context(|| format!("failed to commit records from {}", path.display()))?;
    progress.finish_and_clear();

    stats.files += 1;
    stats.records += records;

    match failure {
        Some(err) => Err(err.context(format!("stopped ingesting {}", path.display()))),
        None => {
            debug!("{}: {records} records", path.display());
            Ok(())
        }
    }
}

fn progress_bar(path: &Path, total_bytes: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total_bytes);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {bytes}/{total_bytes} [{eta}]")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar.set_message(path.display().to_string());
    bar
}
