//! Activity log rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Value stored for numeric fields that were not captured.
pub const UNKNOWN_POSITION: i64 = -1;

/// One row of the activity log, keyed by its capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub ts: DateTime<Utc>,
    pub window_title: String,
    pub command: String,
    pub thing: Option<String>,
    pub motd: Option<String>,
    pub category: Option<String>,
    pub active_task: Option<String>,
    pub desktop: i64,
    pub mouse_x: i64,
    pub mouse_y: i64,
    pub nscreens: i64,
    pub focus_screen: Option<i64>,
    pub locked: bool,
    pub music_playing: bool,
    pub music_app: String,
    pub music_playback: Option<String>,
    pub music_extra: Option<String>,
}

/// Row count per category; `None` collects unclassified rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenCount {
    pub screen_id: i64,
    pub name: String,
    pub count: i64,
}

/// What `stats` reports about a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub records: i64,
    pub screens: i64,
    pub categories: Vec<CategoryCount>,
    pub focus_screens: Vec<ScreenCount>,
}
