//! Process-identity correction.
//!
//! Sandboxed apps (flatpak, network namespaces) show up under the wrapper's
//! process name. The window title usually still names the real app.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMatch {
    EndsWith(&'static str),
    Contains(&'static str),
}

impl TitleMatch {
    fn matches(&self, title: &str) -> bool {
        match self {
            TitleMatch::EndsWith(suffix) => title.ends_with(suffix),
            TitleMatch::Contains(needle) => title.contains(needle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityCorrection {
    pub wrapper: &'static str,
    pub title: TitleMatch,
    pub command: &'static str,
}

impl IdentityCorrection {
    pub fn applies_to(&self, command: &str, title: &str) -> bool {
        command == self.wrapper && self.title.matches(title)
    }
}

/// Evaluated in order; the first matching entry wins.
pub const IDENTITY_CORRECTIONS: &[IdentityCorrection] = &[
    IdentityCorrection {
        wrapper: "kthreadd",
        title: TitleMatch::EndsWith("Slack"),
        command: "slack",
    },
    IdentityCorrection {
        wrapper: "kthreadd",
        title: TitleMatch::EndsWith("Microsoft Teams"),
        command: "teams",
    },
    IdentityCorrection {
        wrapper: "netns",
        title: TitleMatch::Contains("Spotify"),
        command: "spotify",
    },
];

pub fn correct_command(command: &str, title: &str) -> String {
    correct_command_with(IDENTITY_CORRECTIONS, command, title)
}

pub fn correct_command_with(rules: &[IdentityCorrection], command: &str, title: &str) -> String {
    rules
        .iter()
        .find(|rule| rule.applies_to(command, title))
        .map(|rule| rule.command.to_string())
        .unwrap_or_else(|| command.to_string())
}
