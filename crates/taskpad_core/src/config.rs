//! Core runtime configuration.
//!
//! Values come from built-in defaults, optionally overridden by
//! `TASKPAD_*` environment variables. Blank overrides are ignored, and an
//! unusable override falls back to its own default without touching the rest.

use crate::logging::{default_log_level, normalize_level};
use crate::overlay::MotionConfig;
use log::warn;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKPAD_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "TASKPAD_STORAGE_KEY";
pub const ENV_LOG_LEVEL: &str = "TASKPAD_LOG_LEVEL";
pub const ENV_DICTATION_LOCALE: &str = "TASKPAD_DICTATION_LOCALE";

pub const DEFAULT_DB_FILE_NAME: &str = "taskpad.sqlite3";
pub const DEFAULT_STORAGE_KEY: &str = "taskpad.notes";
pub const DEFAULT_DICTATION_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// SQLite file holding the key-value store.
    pub db_path: PathBuf,
    /// Key under which the note collection blob is stored.
    pub storage_key: String,
    /// Level used when the host starts logging without naming one.
    pub log_level: &'static str,
    pub dictation_locale: String,
    pub motion: MotionConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level(),
            dictation_locale: DEFAULT_DICTATION_LOCALE.to_string(),
            motion: MotionConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = value(ENV_STORAGE_KEY) {
            config.storage_key = key;
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            match normalize_level(&level) {
                Ok(level) => config.log_level = level,
                Err(err) => warn!(
                    "event=config_load module=config status=degraded field={} fallback={} error={}",
                    ENV_LOG_LEVEL, config.log_level, err
                ),
            }
        }
        if let Some(locale) = value(ENV_DICTATION_LOCALE) {
            config.dictation_locale = locale;
        }
        config
    }

    /// `requested` when the host names a level, otherwise the configured one.
    pub fn effective_log_level<'a>(&self, requested: &'a str) -> &'a str {
        if requested.trim().is_empty() {
            self.log_level
        } else {
            requested
        }
    }
}
