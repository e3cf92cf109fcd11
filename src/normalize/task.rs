use once_cell::sync::Lazy;
use regex::Regex;

static ACTIVE_TASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((.+)\)").expect("active task regex"));

/// The parenthesised part of a status message, e.g. `focus (PROJ-12)`.
pub fn extract_active_task(motd: &str) -> Option<String> {
    ACTIVE_TASK
        .captures(motd)
        .and_then(|caps| caps.get(1))
        .map(|task| task.as_str().to_string())
}
