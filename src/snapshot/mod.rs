//! Snapshot wire types.
//!
//! One `RawSnapshot` is written per capture as a single JSON line. The
//! capture tool historically scraped numbers out of tool output and wrote
//! them as strings, so every integer field accepts either form.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub mod reader;

pub use reader::{SnapshotLine, SnapshotReader};

/// Integer as found in a snapshot: a JSON number or its decimal text.
///
/// Any other JSON value lands in `Other` so that a mistyped field fails
/// only its own record, not the whole log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexInt {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl FlexInt {
    /// Blank text is treated as absent. Floats are truncated toward zero and
    /// booleans count as 0/1; any other value is an error.
    pub fn to_i64(&self) -> Result<Option<i64>> {
        match self {
            FlexInt::Int(value) => Ok(Some(*value)),
            FlexInt::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| anyhow!("'{text}' is not an integer"))
            }
            FlexInt::Other(serde_json::Value::Bool(flag)) => Ok(Some(i64::from(*flag))),
            FlexInt::Other(serde_json::Value::Number(number)) => number
                .as_f64()
                .filter(|value| value.is_finite() && value.abs() < i64::MAX as f64)
                .map(|value| Some(value.trunc() as i64))
                .ok_or_else(|| anyhow!("{number} does not fit an integer")),
            FlexInt::Other(value) => Err(anyhow!("{value} is not an integer")),
        }
    }
}

impl From<i64> for FlexInt {
    fn from(value: i64) -> Self {
        FlexInt::Int(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MousePosition {
    #[serde(default)]
    pub x: Option<FlexInt>,
    #[serde(default)]
    pub y: Option<FlexInt>,
    #[serde(default)]
    pub screen: Option<FlexInt>,
    #[serde(default, alias = "window")]
    pub window_id: Option<FlexInt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub id: FlexInt,
    pub primary: bool,
    pub name: String,
    pub res_x: FlexInt,
    pub res_y: FlexInt,
    pub off_x: FlexInt,
    pub off_y: FlexInt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionValue {
    Flag(bool),
    Text(String),
}

impl SessionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SessionValue::Flag(flag) => Some(*flag),
            SessionValue::Text(text) => match text.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicStatus {
    pub playing: bool,
    pub app: String,
    pub playback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub ts: String,
    pub title: String,
    #[serde(default)]
    pub comm: Option<String>,
    #[serde(default)]
    pub desktop: Option<FlexInt>,
    #[serde(default)]
    pub mouse: MousePosition,
    #[serde(default)]
    pub screens: Vec<ScreenInfo>,
    #[serde(default)]
    pub session_info: BTreeMap<String, SessionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    pub music: MusicStatus,
    #[serde(default)]
    pub motd: Option<String>,
}

impl RawSnapshot {
    /// Explicit `locked` flag, else the session's `LockedHint`.
    pub fn locked_hint(&self) -> Option<bool> {
        self.locked.or_else(|| {
            self.session_info
                .get("LockedHint")
                .and_then(SessionValue::as_bool)
        })
    }

    pub fn command(&self) -> &str {
        self.comm.as_deref().unwrap_or("")
    }

    /// Status message, with an empty one treated as absent.
    pub fn motd(&self) -> Option<&str> {
        self.motd.as_deref().filter(|motd| !motd.is_empty())
    }
}
