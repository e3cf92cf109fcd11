//! Coarse categories derived from the extracted activity.
//!
//! Rules are tried in order and the first match wins. New categories are
//! added by appending rules, never by changing an earlier one.

use once_cell::sync::Lazy;
use regex::Regex;

use super::apps::KnownApp;

static MAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"mu4e|/Mail\b").expect("mail regex"));
static MEETING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Outlook|Microsoft Teams").expect("meeting regex"));
static DEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"GitHub|Stack Overflow|PyPI|WORKSPACE/|/compile/|magit").expect("devel regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Communication,
    Devel,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Communication => "communication",
            Category::Devel => "devel",
        }
    }
}

pub struct CategoryRule {
    pub category: Category,
    pub matches: fn(app: KnownApp, thing: &str) -> bool,
}

fn is_communication(app: KnownApp, thing: &str) -> bool {
    match app {
        KnownApp::Emacs => MAIL.is_match(thing),
        KnownApp::Slack => true,
        app if app.is_browser() => MEETING.is_match(thing) && !thing.contains("Calendar"),
        _ => false,
    }
}

fn is_devel(_app: KnownApp, thing: &str) -> bool {
    DEVEL.is_match(thing)
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Communication,
        matches: is_communication,
    },
    CategoryRule {
        category: Category::Devel,
        matches: is_devel,
    },
];

/// Nothing is classified without an extracted activity.
pub fn classify(thing: Option<&str>, command: &str) -> Option<Category> {
    classify_with(CATEGORY_RULES, thing, command)
}

pub fn classify_with(rules: &[CategoryRule], thing: Option<&str>, command: &str) -> Option<Category> {
    let thing = thing?;
    let app = KnownApp::from_command(command);
    rules
        .iter()
        .find(|rule| (rule.matches)(app, thing))
        .map(|rule| rule.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_activity_no_category() {
        assert_eq!(classify(None, "slack"), None);
    }

    #[test]
    fn chat_is_always_communication() {
        assert_eq!(classify(Some("General"), "slack"), Some(Category::Communication));
    }

    #[test]
    fn editor_mail_is_communication() {
        assert_eq!(
            classify(Some("*mu4e-headers*"), "emacs"),
            Some(Category::Communication)
        );
        assert_eq!(
            classify(Some("/home/u/Mail/inbox"), "emacs"),
            Some(Category::Communication)
        );
        assert_eq!(classify(Some("/home/u/notes.org"), "emacs"), None);
    }

    #[test]
    fn browser_meetings_are_communication_except_calendar() {
        assert_eq!(
            classify(Some("Mail - Outlook"), "chrome"),
            Some(Category::Communication)
        );
        assert_eq!(
            classify(Some("Microsoft Teams meeting"), "firefox"),
            Some(Category::Communication)
        );
        assert_eq!(classify(Some("Calendar - Outlook"), "chrome"), None);
        assert_eq!(classify(Some("Mail - Outlook"), "okular"), None);
    }

    #[test]
    fn developer_sites_are_devel_for_any_command() {
        assert_eq!(
            classify(Some("GitHub pull request #42"), "anything"),
            Some(Category::Devel)
        );
        assert_eq!(
            classify(Some("magit: whatidid"), "emacs"),
            Some(Category::Devel)
        );
        assert_eq!(
            classify(Some("requests · PyPI"), "firefox"),
            Some(Category::Devel)
        );
    }

    #[test]
    fn communication_outranks_devel() {
        assert_eq!(
            classify(Some("GitHub notifications"), "slack"),
            Some(Category::Communication)
        );
    }

    #[test]
    fn category_names_are_stable() {
        assert_eq!(Category::Communication.as_str(), "communication");
        assert_eq!(Category::Devel.as_str(), "devel");
    }
}
