use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::NormalizedScreen;

fn row_to_screen(row: &Row) -> Result<NormalizedScreen, rusqlite::Error> {
    Ok(NormalizedScreen {
        primary: row.get("is_primary")?,
        name: row.get("name")?,
        res_x: row.get("res_x")?,
        res_y: row.get("res_y")?,
        off_x: row.get("off_x")?,
        off_y: row.get("off_y")?,
    })
}

/// The screen catalog: one row per distinct screen geometry.
pub struct ScreenRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ScreenRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Catalog id for `screen`, inserting it the first time it is seen.
    ///
    /// Structurally equal screens always get the same id.
    pub fn get_or_create(&self, screen: &NormalizedScreen) -> Result<i64> {
        self.conn
            .query_row(
                "INSERT INTO screens (canonical_key, is_primary, name, res_x, res_y, off_x, off_y)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(canonical_key) DO UPDATE SET
                     canonical_key = excluded.canonical_key
                 RETURNING id",
                params![
                    screen.canonical_key(),
                    screen.primary,
                    screen.name,
                    screen.res_x,
                    screen.res_y,
                    screen.off_x,
                    screen.off_y,
                ],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to look up screen {}", screen.canonical_key()))
    }

    pub fn get(&self, id: i64) -> Result<Option<NormalizedScreen>> {
        self.conn
            .query_row(
                "SELECT is_primary, name, res_x, res_y, off_x, off_y
                 FROM screens WHERE id = ?1",
                params![id],
                row_to_screen,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM screens", [], |row| row.get(0))
            .context("failed to count screens")
    }
}
