//! Per-application window-title parsing.

use once_cell::sync::Lazy;
use regex::Regex;

const EDITOR_DIVIDER: &str = "⋄";
/// Broken renderings of the divider seen in older logs, longest first.
const EDITOR_DIVIDER_CORRUPTIONS: [&str; 2] = ["⋄'xb", "⋄xb"];

static CHAT_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.+)\s-\s(.+)\s-\sSlack").expect("chat title regex"));

/// Applications whose titles carry something worth extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownApp {
    Emacs,
    Slack,
    /// Chromium-based browsers; title ends in `- <browser>`.
    Chromium,
    /// Title ends in `— Mozilla Firefox`.
    Firefox,
    Okular,
    Other,
}

/// Outcome of parsing one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    /// No rule applies, or the rule produced only whitespace.
    Empty,
    /// The title did not have the shape this app's rule expects.
    Unrecognised(&'static str),
}

impl Extraction {
    pub fn into_thing(self) -> Option<String> {
        match self {
            Extraction::Found(thing) => Some(thing),
            Extraction::Empty | Extraction::Unrecognised(_) => None,
        }
    }
}

impl KnownApp {
    pub fn from_command(command: &str) -> Self {
        match command {
            "emacs" => KnownApp::Emacs,
            "slack" => KnownApp::Slack,
            "vivaldi-bin" | "chrome" => KnownApp::Chromium,
            "firefox" => KnownApp::Firefox,
            "okular" => KnownApp::Okular,
            _ => KnownApp::Other,
        }
    }

    pub fn is_browser(self) -> bool {
        matches!(self, KnownApp::Chromium | KnownApp::Firefox)
    }

    pub fn extract(self, title: &str) -> Extraction {
        match self {
            KnownApp::Emacs => extract_editor(title),
            KnownApp::Slack => extract_chat(title),
            KnownApp::Chromium => before_last(title, '-'),
            KnownApp::Firefox | KnownApp::Okular => before_last(title, '—'),
            KnownApp::Other => Extraction::Empty,
        }
    }
}

fn non_blank(text: &str) -> Extraction {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Extraction::Empty
    } else {
        Extraction::Found(trimmed.to_string())
    }
}

/// Editor titles read `<buffer> ⋄ <file>`; the file wins when present.
fn extract_editor(title: &str) -> Extraction {
    let cleaned = EDITOR_DIVIDER_CORRUPTIONS
        .iter()
        .fold(title.to_string(), |acc, broken| acc.replace(broken, EDITOR_DIVIDER));

    let mut parts = cleaned.split(EDITOR_DIVIDER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(buffer), Some(file), None) => match non_blank(file) {
            Extraction::Empty => non_blank(buffer),
            found => found,
        },
        _ => Extraction::Unrecognised("emacs title not splittable"),
    }
}

fn extract_chat(title: &str) -> Extraction {
    match CHAT_TITLE.captures(title).and_then(|caps| caps.get(1)) {
        Some(channel) => non_blank(channel.as_str()),
        None => Extraction::Unrecognised("slack title does not match '<a> - <b> - Slack'"),
    }
}

/// Everything before the last `separator`, or the whole title if there is none.
fn before_last(title: &str, separator: char) -> Extraction {
    let head = match title.rfind(separator) {
        Some(index) => &title[..index],
        None => title,
    };
    non_blank(head)
}
