use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Timelike, Utc};

use crate::db::models::UNKNOWN_POSITION;
use crate::snapshot::FlexInt;

/// Renders a timestamp the way the `log.ts` key is stored.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses an ISO-8601 timestamp. A value without an offset is taken as UTC.
/// Sub-second precision is dropped so the result matches the stored key.
pub fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .with_context(|| format!("failed to parse {field} '{value}'"))?,
    };
    parsed
        .with_nanosecond(0)
        .ok_or_else(|| anyhow!("{field} '{value}' cannot be truncated to seconds"))
}

/// Integer that may be missing; absence becomes the -1 sentinel.
pub fn position_or_unknown(value: Option<&FlexInt>, field: &str) -> Result<i64> {
    match value {
        Some(raw) => Ok(raw
            .to_i64()
            .with_context(|| format!("invalid {field}"))?
            .unwrap_or(UNKNOWN_POSITION)),
        None => Ok(UNKNOWN_POSITION),
    }
}

/// Integer that must be present.
pub fn required_int(value: &FlexInt, field: &str) -> Result<i64> {
    value
        .to_i64()
        .with_context(|| format!("invalid {field}"))?
        .ok_or_else(|| anyhow!("{field} is empty"))
}

pub fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn to_count(value: usize, field: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("{field} {value} exceeds SQLite INTEGER range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_to_second_precision() {
        let parsed = parse_timestamp("2023-03-01T10:00:00Z", "ts").unwrap();
        assert_eq!(format_timestamp(&parsed), "2023-03-01T10:00:00Z");

        let offset = parse_timestamp("2023-03-01T11:00:00+01:00", "ts").unwrap();
        assert_eq!(offset, parsed);

        let naive = parse_timestamp("2023-03-01T10:00:00.250", "ts").unwrap();
        assert_eq!(naive, parsed);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("yesterday", "ts").is_err());
    }

    #[test]
    fn missing_positions_become_sentinel() {
        assert_eq!(position_or_unknown(None, "mouse_x").unwrap(), -1);
        assert_eq!(
            position_or_unknown(Some(&FlexInt::Text(String::new())), "mouse_x").unwrap(),
            -1
        );
        assert_eq!(
            position_or_unknown(Some(&FlexInt::Text("0".into())), "mouse_x").unwrap(),
            0
        );
        assert!(position_or_unknown(Some(&FlexInt::Text("n/a".into())), "mouse_x").is_err());
    }

    #[test]
    fn required_int_rejects_blank() {
        assert!(required_int(&FlexInt::Text(" ".into()), "res_x").is_err());
        assert_eq!(required_int(&FlexInt::Int(1080), "res_y").unwrap(), 1080);
    }

    #[test]
    fn blank_strings_are_none() {
        assert_eq!(blank_to_none("  "), None);
        assert_eq!(blank_to_none(" Paused "), Some("Paused".to_string()));
    }
}
