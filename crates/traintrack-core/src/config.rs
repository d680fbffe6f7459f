//! Application configuration management.
//!
//! Configuration is stored at `~/.config/traintrack/config.json`. The API
//! URL can be overridden with the `TRAINTRACK_API_URL` environment
//! variable (a `.env` file is honored by the binary).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "traintrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_url`
pub const API_URL_ENV: &str = "TRAINTRACK_API_URL";

const DEFAULT_TODAY_LABEL: &str = "today";

fn default_today_label() -> String {
    DEFAULT_TODAY_LABEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the attendance API.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Last-visit label written on check-in and counted as "today".
    #[serde(default = "default_today_label")]
    pub today_label: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            today_label: default_today_label(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("logs"))
    }

    /// The API URL to use, with the environment override applied.
    pub fn api_url(&self) -> Result<String> {
        resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// Pick the environment value over the configured one, ignoring blanks.
pub fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> Result<String> {
    let from_env = env.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let from_config = configured.map(str::trim).filter(|v| !v.is_empty());

    match (from_env, from_config) {
        (Some(url), _) => Ok(url),
        (None, Some(url)) => Ok(url.to_string()),
        (None, None) => bail!(
            "No API URL configured. Set {} or add \"api_url\" to {}",
            API_URL_ENV,
            Config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| CONFIG_FILE.to_string())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.today_label, "today");
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = serde_json::from_str(
            r#"{"api_url": "https://gym.example/api", "today_label": "сегодня", "request_timeout_secs": 15}"#,
        )
        .unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://gym.example/api"));
        assert_eq!(config.today_label, "сегодня");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_env_overrides_config() {
        let url = resolve_api_url(Some("http://env/api".into()), Some("http://file/api")).unwrap();
        assert_eq!(url, "http://env/api");

        let url = resolve_api_url(Some("  ".into()), Some(" http://file/api ")).unwrap();
        assert_eq!(url, "http://file/api");

        let err = resolve_api_url(None, Some("")).unwrap_err();
        assert!(err.to_string().contains(API_URL_ENV));
    }
}
