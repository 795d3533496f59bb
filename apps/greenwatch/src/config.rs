use std::{fs, path::Path, time::Duration};

use client_core::{LiveSettings, PollSettings, TransportConfig};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "greenwatch.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub live_debounce_ms: u64,
    pub live_min_chars: usize,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            request_timeout_ms: 30_000,
            live_debounce_ms: 700,
            live_min_chars: 10,
            poll_interval_ms: 10_000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
    live_debounce_ms: Option<u64>,
    live_min_chars: Option<usize>,
    poll_interval_ms: Option<u64>,
}

impl Settings {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn live_settings(&self) -> LiveSettings {
        LiveSettings {
            debounce: Duration::from_millis(self.live_debounce_ms),
            min_chars: self.live_min_chars,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Zero durations would stall polling or fail every request, so they are
/// ignored like any other unusable value.
fn positive_ms(key: &str, value: u64) -> Option<u64> {
    if value == 0 {
        warn!(key, "ignoring zero duration setting");
        None
    } else {
        Some(value)
    }
}

fn env_ms(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = env(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => positive_ms(key, value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric duration setting");
            None
        }
    }
}

/// Defaults, then the settings file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg
                    .request_timeout_ms
                    .and_then(|v| positive_ms("request_timeout_ms", v))
                {
                    settings.request_timeout_ms = v;
                }
                if let Some(v) = file_cfg
                    .live_debounce_ms
                    .and_then(|v| positive_ms("live_debounce_ms", v))
                {
                    settings.live_debounce_ms = v;
                }
                if let Some(v) = file_cfg.live_min_chars {
                    settings.live_min_chars = v;
                }
                if let Some(v) = file_cfg
                    .poll_interval_ms
                    .and_then(|v| positive_ms("poll_interval_ms", v))
                {
                    settings.poll_interval_ms = v;
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("GREENWATCH_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env_ms(&env, "APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = env_ms(&env, "APP__POLL_INTERVAL_MS") {
        settings.poll_interval_ms = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
