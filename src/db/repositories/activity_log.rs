use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    helpers::{format_timestamp, parse_timestamp},
    models::{ActivityRecord, CategoryCount, ScreenCount},
};

/// Columns of `log` that get a secondary index after each ingest run.
pub const LOG_INDEXED_COLUMNS: [&str; 6] = [
    "window_title",
    "command",
    "thing",
    "motd",
    "category",
    "active_task",
];

fn row_to_record(row: &Row) -> Result<ActivityRecord, rusqlite::Error> {
    let ts: String = row.get("ts")?;

    Ok(ActivityRecord {
        ts: parse_timestamp(&ts, "ts").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    e.to_string(),
                )),
            )
        })?,
        window_title: row.get("window_title")?,
        command: row.get("command")?,
        thing: row.get("thing")?,
        motd: row.get("motd")?,
        category: row.get("category")?,
        active_task: row.get("active_task")?,
        desktop: row.get("desktop")?,
        mouse_x: row.get("mouse_x")?,
        mouse_y: row.get("mouse_y")?,
        nscreens: row.get("nscreens")?,
        focus_screen: row.get("focus_screen")?,
        locked: row.get("locked")?,
        music_playing: row.get("music_playing")?,
        music_app: row.get("music_app")?,
        music_playback: row.get("music_playback")?,
        music_extra: row.get("music_extra")?,
    })
}

/// The append-only, timestamp-keyed activity log.
pub struct ActivityLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ActivityLogRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert `record`, replacing any row captured at the same second.
    pub fn upsert(&self, record: &ActivityRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO log (
                    ts,
                    window_title,
                    command,
                    thing,
                    motd,
                    category,
                    active_task,
                    desktop,
                    mouse_x,
                    mouse_y,
                    nscreens,
                    focus_screen,
                    locked,
                    music_playing,
                    music_app,
                    music_playback,
                    music_extra
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
                ON CONFLICT(ts) DO UPDATE SET
                    window_title = excluded.window_title,
                    command = excluded.command,
                    thing = excluded.thing,
                    motd = excluded.motd,
                    category = excluded.category,
                    active_task = excluded.active_task,
                    desktop = excluded.desktop,
                    mouse_x = excluded.mouse_x,
                    mouse_y = excluded.mouse_y,
                    nscreens = excluded.nscreens,
                    focus_screen = excluded.focus_screen,
                    locked = excluded.locked,
                    music_playing = excluded.music_playing,
                    music_app = excluded.music_app,
                    music_playback = excluded.music_playback,
                    music_extra = excluded.music_extra",
                params![
                    format_timestamp(&record.ts),
                    record.window_title,
                    record.command,
                    record.thing,
                    record.motd,
                    record.category,
                    record.active_task,
                    record.desktop,
                    record.mouse_x,
                    record.mouse_y,
                    record.nscreens,
                    record.focus_screen,
                    record.locked,
                    record.music_playing,
                    record.music_app,
                    record.music_playback,
                    record.music_extra,
                ],
            )
            .with_context(|| format!("failed to upsert log row {}", format_timestamp(&record.ts)))?;
        Ok(())
    }

    pub fn get(&self, ts: &chrono::DateTime<chrono::Utc>) -> Result<Option<ActivityRecord>> {
        self.conn
            .query_row(
                "SELECT * FROM log WHERE ts = ?1",
                params![format_timestamp(ts)],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))
            .context("failed to count log rows")
    }

    /// Create the secondary indexes. Safe to run after every batch.
    pub fn rebuild_indexes(&self) -> Result<()> {
        for column in LOG_INDEXED_COLUMNS {
            self.conn
                .execute_batch(&format!(
                    "CREATE INDEX IF NOT EXISTS idx_log_{column} ON log({column})"
                ))
                .with_context(|| format!("failed to create index on log.{column}"))?;
        }
        Ok(())
    }

    pub fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) AS n
             FROM log
             GROUP BY category
             ORDER BY n DESC, category ASC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    pub fn screen_counts(&self) -> Result<Vec<ScreenCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT screens.id, screens.name, COUNT(log.ts) AS n
             FROM log
             JOIN screens ON screens.id = log.focus_screen
             GROUP BY screens.id
             ORDER BY n DESC, screens.id ASC",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(ScreenCount {
                    screen_id: row.get(0)?,
                    name: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NormalizedScreen};
    use chrono::{TimeZone, Utc};

    fn record_at(second: u32, db: &Database) -> ActivityRecord {
        let screen = db
            .screens()
            .get_or_create(&NormalizedScreen::no_screen())
            .unwrap();
        ActivityRecord {
            ts: Utc.with_ymd_and_hms(2023, 3, 1, 10, 0, second).unwrap(),
            window_title: "General - #team - Slack".into(),
            command: "slack".into(),
            thing: Some("General".into()),
            motd: None,
            category: Some("communication".into()),
            active_task: None,
            desktop: 1,
            mouse_x: -1,
            mouse_y: -1,
            nscreens: 0,
            focus_screen: Some(screen),
            locked: false,
            music_playing: false,
            music_app: String::new(),
            music_playback: None,
            music_extra: None,
        }
    }

    #[test]
    fn upsert_replaces_row_with_same_timestamp() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.activity_log();

        let original = record_at(0, &db);
        repo.upsert(&original).unwrap();

        let mut corrected = original.clone();
        corrected.thing = Some("random".into());
        repo.upsert(&corrected).unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(&original.ts).unwrap(), Some(corrected));
    }

    #[test]
    fn distinct_timestamps_are_distinct_rows() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.activity_log();

        repo.upsert(&record_at(0, &db)).unwrap();
        repo.upsert(&record_at(1, &db)).unwrap();

        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn rebuild_indexes_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.activity_log();

        repo.rebuild_indexes().unwrap();
        repo.rebuild_indexes().unwrap();

        let indexes: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_log_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, LOG_INDEXED_COLUMNS.len() as i64);
    }

    #[test]
    fn counts_group_by_category_and_screen() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.activity_log();

        repo.upsert(&record_at(0, &db)).unwrap();
        repo.upsert(&record_at(1, &db)).unwrap();
        let mut unclassified = record_at(2, &db);
        unclassified.category = None;
        repo.upsert(&unclassified).unwrap();

        let categories = repo.category_counts().unwrap();
        assert_eq!(
            categories,
            vec![
                CategoryCount {
                    category: Some("communication".into()),
                    count: 2
                },
                CategoryCount {
                    category: None,
                    count: 1
                },
            ]
        );

        let screens = repo.screen_counts().unwrap();
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].name, NormalizedScreen::NO_SCREEN_NAME);
        assert_eq!(screens[0].count, 3);
    }
}
