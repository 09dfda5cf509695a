use std::{fs, path::Path, time::Duration};

use client_core::{RenderOptions, DEFAULT_BUSY_INDICATOR};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "draftboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    /// Unset waits on the backend indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub markdown: RenderOptions,
    pub busy_indicator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8888".into(),
            request_timeout_secs: None,
            markdown: RenderOptions::default(),
            busy_indicator: DEFAULT_BUSY_INDICATOR.into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "ignoring unreadable config file");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn parse_settings(raw: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(raw)
}

pub fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DRAFTBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }

    if let Some(parsed) = var("APP__MARKDOWN_HARD_BREAKS").and_then(|v| parse_flag(&v)) {
        settings.markdown.hard_breaks = parsed;
    }
    if let Some(parsed) = var("APP__MARKDOWN_GFM").and_then(|v| parse_flag(&v)) {
        settings.markdown.github_flavored = parsed;
    }
    if let Some(parsed) = var("APP__MARKDOWN_HEADER_IDS").and_then(|v| parse_flag(&v)) {
        settings.markdown.header_ids = parsed;
    }

    if let Some(v) = var("APP__BUSY_INDICATOR") {
        settings.busy_indicator = v;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
