use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// File holding the current status message; absent file means no motd.
    pub motd_path: PathBuf,
    /// Command printing the media player state as JSON.
    pub music_command: Vec<String>,
    pub window_query_attempts: u32,
    /// Backoff grows by this much after each failed window query.
    pub retry_backoff_secs: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            motd_path: home_dir().join("var").join("current-emacs-motd"),
            music_command: vec!["currently_playing_music".into(), "json".into()],
            window_query_attempts: 3,
            retry_backoff_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    capture: CaptureSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| home_dir().join(".config"))
            .join("whatidid")
            .join("settings.json")
    }

    /// Loads settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?
        } else {
            UserSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn capture(&self) -> &CaptureSettings {
        &self.data.capture
    }
}
