//! Desktop state queries backed by the usual X11/systemd tools.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::snapshot::{FlexInt, MousePosition, MusicStatus, ScreenInfo, SessionValue};

static MONITOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<id>\d+):\s+\+(?P<primary>\*?)(?P<name>[\w-]+)\s+(?P<res_x>\d+)/\d+x(?P<res_y>\d+)/\d+\+(?P<off_x>-?\d+)\+(?P<off_y>-?\d+)",
    )
    .expect("monitor line regex")
});

static SESSION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)=(.+)$").expect("session line regex"));

static MOUSE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"x:(?P<x>\d+)\s+y:(?P<y>\d+)\s+screen:(?P<screen>\d+)\s+window:(?P<window_id>\d+)")
        .expect("mouse line regex")
});

/// Focused window and pointer state.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub title: String,
    pub comm: Option<String>,
    pub desktop: Option<FlexInt>,
    pub mouse: MousePosition,
}

impl WindowState {
    /// Recorded when the window manager cannot be queried at all.
    pub fn unknown() -> Self {
        Self {
            title: "UNKNOWN".into(),
            comm: Some(String::new()),
            desktop: None,
            mouse: MousePosition::default(),
        }
    }
}

/// Raw fields of a window query before the pid is resolved to a name.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowQuery {
    pub title: String,
    pub pid: Option<u32>,
    pub desktop: Option<FlexInt>,
    pub mouse: MousePosition,
}

pub fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {program}"))?;

    if !output.status.success() {
        bail!(
            "{program} {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    String::from_utf8(output.stdout).with_context(|| format!("{program} printed invalid UTF-8"))
}

fn int_capture(caps: &regex::Captures<'_>, name: &str) -> Result<FlexInt> {
    let text = caps
        .name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| anyhow!("missing {name}"))?;
    text.parse::<i64>()
        .map(FlexInt::Int)
        .with_context(|| format!("{name} '{text}' out of range"))
}

/// Parses `xrandr --listmonitors`.
pub fn parse_monitors(output: &str) -> Result<Vec<ScreenInfo>> {
    let mut screens = Vec::new();
    for line in output.lines() {
        // The header line ("Monitors: 2") has no leading whitespace.
        if !line.starts_with(char::is_whitespace) {
            continue;
        }
        let Some(caps) = MONITOR_LINE.captures(line) else {
            continue;
        };
        screens.push(ScreenInfo {
            id: int_capture(&caps, "id")?,
            primary: &caps["primary"] == "*",
            name: caps["name"].to_string(),
            res_x: int_capture(&caps, "res_x")?,
            res_y: int_capture(&caps, "res_y")?,
            off_x: int_capture(&caps, "off_x")?,
            off_y: int_capture(&caps, "off_y")?,
        });
    }
    Ok(screens)
}

/// Parses `loginctl show-session` output. `yes`/`no` become booleans.
pub fn parse_session(output: &str) -> BTreeMap<String, SessionValue> {
    output
        .lines()
        .filter_map(|line| SESSION_LINE.captures(line))
        .map(|caps| {
            let value = match &caps[2] {
                "yes" => SessionValue::Flag(true),
                "no" => SessionValue::Flag(false),
                other => SessionValue::Text(other.to_string()),
            };
            (caps[1].to_string(), value)
        })
        .collect()
}

fn parse_mouse(line: &str) -> MousePosition {
    let Some(caps) = MOUSE_LINE.captures(line) else {
        return MousePosition::default();
    };
    let field = |name: &str| caps.name(name).and_then(|m| m.as_str().parse().ok()).map(FlexInt::Int);
    MousePosition {
        x: field("x"),
        y: field("y"),
        screen: field("screen"),
        window_id: field("window_id"),
    }
}

/// Parses the four lines printed by
/// `xdotool getwindowfocus getwindowname getwindowpid get_desktop getmouselocation`.
pub fn parse_window_query(output: &str) -> Result<WindowQuery> {
    let lines: Vec<&str> = output.lines().collect();
    if lines.len() < 4 {
        bail!("expected 4 lines from xdotool, got {}: {output:?}", lines.len());
    }

    let desktop = lines[2].trim();
    Ok(WindowQuery {
        title: lines[0].to_string(),
        pid: lines[1].trim().parse().ok(),
        desktop: match desktop.parse::<i64>() {
            Ok(value) => Some(FlexInt::Int(value)),
            Err(_) if desktop.is_empty() => None,
            Err(_) => Some(FlexInt::Text(desktop.to_string())),
        },
        mouse: parse_mouse(lines[3]),
    })
}

pub fn parse_music(output: &str) -> Result<MusicStatus> {
    serde_json::from_str(output).context("media status is not the expected JSON object")
}

pub fn process_name(pid: u32) -> Option<String> {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), ProcessRefreshKind::new());
    system
        .process(pid)
        .map(|process| process.name().to_string_lossy().into_owned())
}

/// Trimmed contents of the status message file; a missing file is no message.
pub fn read_motd(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read motd {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const XRANDR: &str = "Monitors: 2\n 0: +*eDP-1 1920/344x1080/194+0+0  eDP-1\n 1: +HDMI-1 2560/597x1440/336+1920+0  HDMI-1\n";

    #[test]
    fn parses_monitor_list() {
        let screens = parse_monitors(XRANDR).unwrap();

        assert_eq!(screens.len(), 2);
        assert!(screens[0].primary);
        assert_eq!(screens[0].name, "eDP-1");
        assert_eq!(screens[0].res_y, FlexInt::Int(1080));
        assert!(!screens[1].primary);
        assert_eq!(screens[1].id, FlexInt::Int(1));
        assert_eq!(screens[1].off_x, FlexInt::Int(1920));
    }

    #[test]
    fn no_monitors_is_empty_list() {
        assert!(parse_monitors("Monitors: 0\n").unwrap().is_empty());
    }

    #[test]
    fn parses_session_flags() {
        let session = parse_session("Id=2\nLockedHint=no\nActive=yes\nName=seri\n\n");

        assert_eq!(session.get("LockedHint"), Some(&SessionValue::Flag(false)));
        assert_eq!(session.get("Active"), Some(&SessionValue::Flag(true)));
        assert_eq!(session.get("Name"), Some(&SessionValue::Text("seri".into())));
    }

    #[test]
    fn parses_window_query() {
        let query = parse_window_query(
            "General - #team - Slack\n4242\n1\nx:10 y:20 screen:0 window:123456\n",
        )
        .unwrap();

        assert_eq!(query.title, "General - #team - Slack");
        assert_eq!(query.pid, Some(4242));
        assert_eq!(query.desktop, Some(FlexInt::Int(1)));
        assert_eq!(query.mouse.screen, Some(FlexInt::Int(0)));
        assert_eq!(query.mouse.window_id, Some(FlexInt::Int(123456)));
    }

    #[test]
    fn unexpected_mouse_line_leaves_mouse_empty() {
        let query = parse_window_query("t\n1\n0\ngarbage\n").unwrap();
        assert_eq!(query.mouse, MousePosition::default());
    }

    #[test]
    fn short_window_query_is_an_error() {
        assert!(parse_window_query("only title\n").is_err());
    }

    #[test]
    fn parses_music_status() {
        let music =
            parse_music(r#"{"playing": true, "app": "spotify", "playback": "Song", "extra": "x"}"#)
                .unwrap();
        assert!(music.playing);
        assert_eq!(music.extra.as_deref(), Some("x"));
        assert!(parse_music("nope").is_err());
    }

    #[test]
    fn motd_is_optional() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("motd");
        assert_eq!(read_motd(&path).unwrap(), None);

        std::fs::write(&path, "writing (DOC-3)\n").unwrap();
        assert_eq!(read_motd(&path).unwrap().as_deref(), Some("writing (DOC-3)"));
    }
}
