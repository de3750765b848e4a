//! Engine settings
//!
//! Loaded from (in order of priority):
//! 1. JSON file in the Ward config directory (~/.config/ward/worklist.json)
//! 2. Environment variables (WARD_PAGE_SIZE, WARD_AUTO_INVALIDATE_SECS, ...)
//! 3. Built-in defaults

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings filename in the Ward config directory
const SETTINGS_FILE: &str = "worklist.json";

const ENV_PAGE_SIZE: &str = "WARD_PAGE_SIZE";
const ENV_AUTO_INVALIDATE_SECS: &str = "WARD_AUTO_INVALIDATE_SECS";
const ENV_MAX_SEARCH_MATCHES: &str = "WARD_MAX_SEARCH_MATCHES";
const ENV_MIN_SEARCH_TERM_LEN: &str = "WARD_MIN_SEARCH_TERM_LEN";

/// Settings shared by every folder of a folder system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Items per page for paged folders
    pub page_size: usize,
    /// Seconds after which fetched data is implicitly stale (None = never)
    pub auto_invalidate_secs: Option<u64>,
    /// Searches matching more items than this are rejected
    pub max_search_matches: usize,
    /// Minimum significant characters in a search without field filters
    pub min_search_term_len: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            auto_invalidate_secs: Some(300),
            max_search_matches: 500,
            min_search_term_len: 3,
        }
    }
}

impl EngineSettings {
    /// Load settings using the following priority:
    /// 1. JSON file (~/.config/ward/worklist.json)
    /// 2. Environment variables over built-in defaults
    pub fn load() -> Result<Self> {
        if config::config_exists(SETTINGS_FILE) {
            let settings: Self = config::load_json(SETTINGS_FILE)?;
            return settings.validated();
        }

        Self::from_env()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Self = config::load_json_file(path)?;
        settings.validated()
    }

    /// Parse settings from a JSON string; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).context("Failed to parse worklist settings JSON")?;
        settings.validated()
    }

    /// Defaults overridden by any WARD_* environment variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values from `lookup` (an environment stand-in)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            settings.page_size = parse_var(ENV_PAGE_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_AUTO_INVALIDATE_SECS) {
            // 0 disables auto-invalidation
            let secs: u64 = parse_var(ENV_AUTO_INVALIDATE_SECS, &value)?;
            settings.auto_invalidate_secs = (secs > 0).then_some(secs);
        }
        if let Some(value) = lookup(ENV_MAX_SEARCH_MATCHES) {
            settings.max_search_matches = parse_var(ENV_MAX_SEARCH_MATCHES, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_SEARCH_TERM_LEN) {
            settings.min_search_term_len = parse_var(ENV_MIN_SEARCH_TERM_LEN, &value)?;
        }

        settings.validated()
    }

    /// Save settings to the Ward config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(SETTINGS_FILE, self)
    }

    /// Save settings to a specific JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        config::save_json_file(path, self)
    }

    /// Get the default settings file path (~/.config/ward/worklist.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }

    /// Auto-invalidate interval as a duration
    pub fn auto_invalidate_interval(&self) -> Option<Duration> {
        self.auto_invalidate_secs.map(Duration::from_secs)
    }

    fn validated(self) -> Result<Self> {
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        if self.max_search_matches == 0 {
            bail!("max_search_matches must be greater than zero");
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .ok()
        .with_context(|| format!("{} has an invalid value: {:?}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "page_size": 25,
            "auto_invalidate_secs": 60,
            "max_search_matches": 200,
            "min_search_term_len": 2
        }"#;

        let settings = EngineSettings::from_json(json).unwrap();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.auto_invalidate_interval(), Some(Duration::from_secs(60)));
        assert_eq!(settings.max_search_matches, 200);
        assert_eq!(settings.min_search_term_len, 2);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings = EngineSettings::from_json(r#"{ "page_size": 10 }"#).unwrap();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.max_search_matches, EngineSettings::default().max_search_matches);
    }

    #[test]
    fn test_null_interval_disables_auto_invalidate() {
        let settings = EngineSettings::from_json(r#"{ "auto_invalidate_secs": null }"#).unwrap();
        assert_eq!(settings.auto_invalidate_interval(), None);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(EngineSettings::from_json(r#"{ "page_size": 0 }"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worklist.json");
        std::fs::write(&path, r#"{ "page_size": 15 }"#).unwrap();

        let settings = EngineSettings::from_file(&path).unwrap();
        assert_eq!(settings.page_size, 15);
    }

    #[test]
    fn test_save_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worklist.json");
        let settings = EngineSettings {
            page_size: 30,
            auto_invalidate_secs: None,
            ..EngineSettings::default()
        };

        settings.save_to_file(&path).unwrap();
        assert_eq!(EngineSettings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WARD_PAGE_SIZE", "20"),
            ("WARD_AUTO_INVALIDATE_SECS", "0"),
        ]
        .into_iter()
        .collect();

        let settings =
            EngineSettings::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.auto_invalidate_secs, None);
        assert_eq!(settings.min_search_term_len, 3);
    }

    #[test]
    fn test_lookup_invalid_value() {
        let result = EngineSettings::from_lookup(|name| {
            (name == "WARD_PAGE_SIZE").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}
