use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_SEARCH_BASE: &str = "https://github.com";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Pick the GitHub token: a non-blank flag wins over a non-blank environment value.
pub fn resolve_token(flag: Option<&str>, env_value: Option<String>) -> Result<String> {
    match flag {
        Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
        _ => match env_value {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(Error::MissingToken),
        },
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub token: String,
    pub api_base: String,
    pub max_results: Option<usize>,
}

impl ApiConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_results: None,
        }
    }
}

/// Settings for the browser driven search.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub search_base: String,
    /// WebDriver endpoint tried first, before spawning a driver ourselves.
    pub webdriver_url: String,
    pub chromedriver: PathBuf,
    pub driver_port: u16,
    pub headless: bool,
    /// How long to wait for the results list to show up.
    pub wait_timeout: Duration,
    /// Pause after every navigation before reading items.
    pub page_settle: Duration,
    pub max_results: Option<usize>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_base: DEFAULT_SEARCH_BASE.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            chromedriver: PathBuf::from("chromedriver"),
            driver_port: 9515,
            headless: false,
            wait_timeout: Duration::from_secs(10),
            page_settle: Duration::from_secs(2),
            max_results: None,
        }
    }
}

impl ScrapeConfig {
    /// Defaults overridden by `GHCS_WEBDRIVER_URL` and `CHROMEDRIVER_PATH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("GHCS_WEBDRIVER_URL") {
            if !url.trim().is_empty() {
                config.webdriver_url = url;
            }
        }
        if let Ok(path) = env::var("CHROMEDRIVER_PATH") {
            if !path.trim().is_empty() {
                config.chromedriver = PathBuf::from(path);
            }
        }
        config
    }
}

/// How a downloaded body is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Bytes,
    /// Decoded as UTF-8 text before writing.
    Text,
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    pub token: Option<String>,
    pub body: BodyMode,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY environment variable not set".to_string()))?;

        let model = env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            api_key,
            model,
            base_url: DEFAULT_GEMINI_BASE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_token_wins() {
        let token = resolve_token(Some("abc"), Some("env".to_string())).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn blank_flag_falls_back_to_env() {
        let token = resolve_token(Some("  "), Some("env".to_string())).unwrap();
        assert_eq!(token, "env");
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(matches!(resolve_token(None, None), Err(Error::MissingToken)));
        assert!(matches!(
            resolve_token(None, Some(String::new())),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn scrape_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.wait_timeout, Duration::from_secs(10));
        assert_eq!(config.page_settle, Duration::from_secs(2));
        assert!(!config.headless);
    }
}
