//! Snapshot capture.
//!
//! Collects one `RawSnapshot` from the desktop. The window query is retried
//! and degrades to an UNKNOWN window; every other query failing aborts the
//! capture so no partial snapshot is written.

pub mod probes;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::warn;

use crate::db::helpers::format_timestamp;
use crate::settings::CaptureSettings;
use crate::snapshot::{MusicStatus, RawSnapshot, ScreenInfo, SessionValue};

pub use probes::WindowState;

/// Sources of desktop state.
pub trait DesktopQueries {
    fn monitors(&self) -> Result<Vec<ScreenInfo>>;
    fn session(&self) -> Result<BTreeMap<String, SessionValue>>;
    fn window(&self) -> Result<WindowState>;
    fn music(&self) -> Result<MusicStatus>;
    fn motd(&self) -> Result<Option<String>>;
}

/// Queries the running X11 session through external tools.
pub struct SystemQueries<'a> {
    settings: &'a CaptureSettings,
}

impl<'a> SystemQueries<'a> {
    pub fn new(settings: &'a CaptureSettings) -> Self {
        Self { settings }
    }
}

impl DesktopQueries for SystemQueries<'_> {
    fn monitors(&self) -> Result<Vec<ScreenInfo>> {
        probes::parse_monitors(&probes::run_command("xrandr", &["--listmonitors"])?)
    }

    fn session(&self) -> Result<BTreeMap<String, SessionValue>> {
        let output = probes::run_command("loginctl", &["show-session", "self"])?;
        Ok(probes::parse_session(&output))
    }

    fn window(&self) -> Result<WindowState> {
        let output = probes::run_command(
            "xdotool",
            &[
                "getwindowfocus",
                "getwindowname",
                "getwindowpid",
                "get_desktop",
                "getmouselocation",
            ],
        )?;
        let query = probes::parse_window_query(&output)?;
        Ok(WindowState {
            title: query.title,
            comm: query.pid.and_then(probes::process_name),
            desktop: query.desktop,
            mouse: query.mouse,
        })
    }

    fn music(&self) -> Result<MusicStatus> {
        let (program, args) = self
            .settings
            .music_command
            .split_first()
            .ok_or_else(|| anyhow!("music_command is empty"))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        probes::parse_music(&probes::run_command(program, &args)?)
    }

    fn motd(&self) -> Result<Option<String>> {
        probes::read_motd(&self.settings.motd_path)
    }
}

/// Wait before the attempt following failed attempt `failed` (0-based).
pub fn backoff_delay(failed: u32, step: Duration) -> Duration {
    step * failed
}

/// Runs `op` up to `attempts` times, waiting 0, step, 2*step, ... between tries.
pub fn retry_with_backoff<T>(
    label: &str,
    attempts: u32,
    step: Duration,
    op: impl FnMut() -> Result<T>,
) -> Result<T> {
    retry_with_sleeper(label, attempts, step, std::thread::sleep, op)
}

fn retry_with_sleeper<T>(
    label: &str,
    attempts: u32,
    step: Duration,
    mut sleep: impl FnMut(Duration),
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            sleep(backoff_delay(attempt - 1, step));
        }
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("{label} failed {}/{attempts}: {err:#}", attempt + 1);
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{label} was not attempted")))
}

pub fn capture_snapshot(queries: &dyn DesktopQueries, settings: &CaptureSettings) -> Result<RawSnapshot> {
    let screens = queries.monitors().context("monitor layout query failed")?;
    let session_info = queries.session().context("session query failed")?;
    let locked = session_info
        .get("LockedHint")
        .and_then(SessionValue::as_bool)
        .ok_or_else(|| anyhow!("session info has no LockedHint"))?;
    let ts = format_timestamp(&Utc::now());

    let window = retry_with_backoff(
        "window query",
        settings.window_query_attempts,
        Duration::from_secs(settings.retry_backoff_secs),
        || queries.window(),
    )
    .unwrap_or_else(|err| {
        warn!("window query gave up, recording UNKNOWN window: {err:#}");
        WindowState::unknown()
    });

    let music = queries.music().context("media status query failed")?;
    let motd = queries.motd()?;

    Ok(RawSnapshot {
        ts,
        title: window.title,
        comm: window.comm,
        desktop: window.desktop,
        mouse: window.mouse,
        screens,
        session_info,
        locked: Some(locked),
        music,
        motd,
    })
}
