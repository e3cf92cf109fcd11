use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info};
use rusqlite::{Connection, Transaction};

pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

use migrations::run_migrations;

pub use models::{ActivityRecord, CategoryCount, NormalizedScreen, ScreenCount, StoreSummary};
pub use repositories::{ActivityLogRepository, ScreenRepository};

/// The ingestion store. Owned by a single writer for the length of a run.
pub struct Database {
    conn: Connection,
    db_path: PathBuf,
}

impl Database {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let mut conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open SQLite database {}", db_path.display()))?;
        configure(&mut conn)?;

        info!("Database initialized at {}", db_path.display());

        Ok(Self { conn, db_path })
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut conn =
            Connection::open_in_memory().context("failed to open in-memory SQLite database")?;
        configure(&mut conn)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction()
            .context("failed to open write transaction")
    }

    pub fn screens(&self) -> ScreenRepository<'_> {
        ScreenRepository::new(&self.conn)
    }

    pub fn activity_log(&self) -> ActivityLogRepository<'_> {
        ActivityLogRepository::new(&self.conn)
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        let log = self.activity_log();
        Ok(StoreSummary {
            records: log.count()?,
            screens: self.screens().count()?,
            categories: log.category_counts()?,
            focus_screens: log.screen_counts()?,
        })
    }
}

fn configure(conn: &mut Connection) -> Result<()> {
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }
    if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
        error!("Failed to enable foreign keys: {err}");
    }

    run_migrations(conn).context("failed to run database migrations")
}
