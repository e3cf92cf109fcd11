//! Turns raw window titles into activities and categories.

pub mod apps;
pub mod category;
pub mod identity;
pub mod screen;
pub mod task;

use log::warn;

pub use apps::{Extraction, KnownApp};
pub use category::{classify, Category};
pub use identity::correct_command;
pub use screen::resolve_focus_screen;
pub use task::extract_active_task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedActivity {
    pub command: String,
    pub thing: Option<String>,
    pub category: Option<Category>,
    pub active_task: Option<String>,
    /// Soft failures worth a human look; the activity is still usable.
    pub warnings: Vec<String>,
}

pub fn normalize_activity(title: &str, command: &str, motd: Option<&str>) -> NormalizedActivity {
    let command = correct_command(command, title);
    let mut warnings = Vec::new();

    let thing = match KnownApp::from_command(&command).extract(title) {
        Extraction::Unrecognised(reason) => {
            let message = format!("{reason}: {title}");
            warn!("{message}");
            warnings.push(message);
            None
        }
        extraction => extraction.into_thing(),
    };

    let active_task = motd.and_then(|motd| {
        let task = extract_active_task(motd);
        if task.is_none() {
            let message = format!("no active task in motd: {motd}");
            warn!("{message}");
            warnings.push(message);
        }
        task
    });

    let category = classify(thing.as_deref(), &command);

    NormalizedActivity {
        command,
        thing,
        category,
        active_task,
        warnings,
    }
}
