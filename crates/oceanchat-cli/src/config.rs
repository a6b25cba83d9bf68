use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
const API_BASE_ENV: &str = "OCEANCHAT_API_BASE";

/// File-backed settings. Everything is optional; resolution order for the
/// backend address is flag > environment > file > default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_base: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Config {
    /// Load the global config file if one exists; a missing file is the
    /// default configuration, a malformed one is an error.
    pub fn load() -> Result<Self> {
        match global_config_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the backend base URL from the `--url` flag, the
    /// `OCEANCHAT_API_BASE` environment variable, the config file, or the
    /// built-in default, in that order.
    pub fn resolve_api_base(&self, flag: Option<&str>) -> String {
        if let Some(url) = flag {
            return url.to_string();
        }
        if let Some(url) = std::env::var(API_BASE_ENV).ok().filter(|v| !v.trim().is_empty()) {
            return url;
        }
        self.api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("oceanchat").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_the_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("nope.json")).unwrap();
        assert!(config.api_base.is_none());
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn file_values_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_base":"http://10.0.0.5:9000","request_timeout_secs":5}"#,
        )
        .unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.api_base.as_deref(), Some("http://10.0.0.5:9000"));
        assert_eq!(config.request_timeout_secs, Some(5));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn flag_wins_over_file_value() {
        let config = Config {
            api_base: Some("http://from-file".into()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_base(Some("http://from-flag")),
            "http://from-flag"
        );
    }

    #[test]
    fn default_base_applies_when_nothing_is_set() {
        std::env::remove_var("OCEANCHAT_API_BASE");
        let config = Config::default();
        assert_eq!(config.resolve_api_base(None), DEFAULT_API_BASE);
    }
}
