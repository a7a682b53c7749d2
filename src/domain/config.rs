//! # Configuration
//!
//! Loads the bot settings from an optional YAML file (`data/config.yaml`) and the
//! `BOT_*` environment variables, which take precedence over the file.
//! Missing required settings are reported as a `ConfigError` and abort startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_URL: &str = "BOT_URL";
pub const ENV_TOKEN: &str = "BOT_TOKEN";
pub const ENV_HOMESERVER: &str = "BOT_HOMESERVER";
pub const ENV_USER: &str = "BOT_USER";
pub const ENV_DEVICE_ID: &str = "BOT_DEVICE_ID";
pub const ENV_LOG_LEVEL: &str = "BOT_LOG_LEVEL";
pub const ENV_REQ_DELAY: &str = "BOT_REQ_DELAY";
pub const ENV_PREFIX: &str = "BOT_PREFIX";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting `{key}` (set {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
}

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`; every section is optional.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Remote quote database settings.
#[derive(Debug, Deserialize, Clone)]
pub struct QuotesConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            refresh_interval_ms: default_refresh_interval_ms(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl QuotesConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn default_refresh_interval_ms() -> u64 {
    30 * 60 * 1000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.132 Safari/537.36".to_string()
}
fn default_max_redirects() -> usize {
    3
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    #[serde(default)]
    pub homeserver: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_device_id")]
    pub device_id: String,
    #[serde(default)]
    pub access_token: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            homeserver: String::new(),
            user_id: String::new(),
            device_id: default_device_id(),
            access_token: String::new(),
        }
    }
}

fn default_device_id() -> String {
    "ARRAYSAYS".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_dir(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    /// Normalized tracing level name; unknown names fall back to `info`.
    pub fn level_directive(&self) -> &'static str {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" => "error",
            _ => "info",
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}

/// How the bot is invoked and how quote replies look.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplyConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default = "default_footer_label")]
    pub footer_label: String,
    #[serde(default = "default_footer_icon_url")]
    pub footer_icon_url: Option<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            color: default_color(),
            footer_label: default_footer_label(),
            footer_icon_url: default_footer_icon_url(),
        }
    }
}

fn default_prefix() -> String {
    "[]says".to_string()
}
fn default_color() -> u32 {
    0x2196F3
}
fn default_footer_label() -> String {
    "Arraying".to_string()
}
/// Must be an `mxc://` URI; clients do not load external images.
fn default_footer_icon_url() -> Option<String> {
    None
}

/// Tuning for free-text quote search.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub location: usize,
    #[serde(default = "default_distance")]
    pub distance: usize,
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            location: 0,
            distance: default_distance(),
            max_pattern_length: default_max_pattern_length(),
        }
    }
}

fn default_threshold() -> f64 {
    0.8
}
fn default_distance() -> usize {
    100
}
fn default_max_pattern_length() -> usize {
    16
}

impl AppConfig {
    /// Reads the YAML file (if any), applies the process environment and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Overrides file values with `BOT_*` variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.quotes.url = url;
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.matrix.access_token = token;
        }
        if let Some(homeserver) = get(ENV_HOMESERVER) {
            self.matrix.homeserver = homeserver;
        }
        if let Some(user) = get(ENV_USER) {
            self.matrix.user_id = user;
        }
        if let Some(device) = get(ENV_DEVICE_ID) {
            self.matrix.device_id = device;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(prefix) = get(ENV_PREFIX) {
            self.reply.prefix = prefix;
        }
        // Zero or garbage keeps the configured interval.
        if let Some(delay) = get(ENV_REQ_DELAY).and_then(|v| v.trim().parse::<u64>().ok())
            && delay > 0
        {
            self.quotes.refresh_interval_ms = delay;
        }
    }

    /// Checks that every setting without a sensible default is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.quotes.url, "quotes.url", ENV_URL),
            (&self.matrix.access_token, "matrix.access_token", ENV_TOKEN),
            (&self.matrix.homeserver, "matrix.homeserver", ENV_HOMESERVER),
            (&self.matrix.user_id, "matrix.user_id", ENV_USER),
        ];
        for (value, key, env) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { key, env });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.quotes.refresh_interval(), Duration::from_secs(30 * 60));
        assert_eq!(config.quotes.max_redirects, 3);
        assert_eq!(config.reply.prefix, "[]says");
        assert_eq!(config.reply.color, 0x2196F3);
        assert_eq!(config.search.max_pattern_length, 16);
        assert_eq!(config.logging.level_directive(), "info");
        // external icons never render in Matrix clients
        assert_eq!(config.reply.footer_icon_url, None);
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            (ENV_URL, "https://example.com/quotes.json"),
            (ENV_TOKEN, "secret"),
            (ENV_HOMESERVER, "https://matrix.example.com"),
            (ENV_USER, "@bot:example.com"),
            (ENV_LOG_LEVEL, "DEBUG"),
            (ENV_REQ_DELAY, "60000"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|k| vars.get(k).cloned());

        assert_eq!(config.quotes.url, "https://example.com/quotes.json");
        assert_eq!(config.matrix.access_token, "secret");
        assert_eq!(config.quotes.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.logging.level_directive(), "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_delay_keeps_default() {
        for raw in ["soon", "0", ""] {
            let vars = env(&[(ENV_REQ_DELAY, raw)]);
            let mut config = AppConfig::default();
            config.apply_env(|k| vars.get(k).cloned());
            assert_eq!(config.quotes.refresh_interval_ms, 30 * 60 * 1000);
        }
    }

    #[test]
    fn test_missing_url_is_reported() {
        let vars = env(&[
            (ENV_TOKEN, "secret"),
            (ENV_HOMESERVER, "https://matrix.example.com"),
            (ENV_USER, "@bot:example.com"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|k| vars.get(k).cloned());
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing {
                key: "quotes.url",
                env: ENV_URL
            })
        );
    }

    #[test]
    fn test_missing_token_is_reported() {
        let vars = env(&[
            (ENV_URL, "https://example.com/quotes.json"),
            (ENV_HOMESERVER, "https://matrix.example.com"),
            (ENV_USER, "@bot:example.com"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|k| vars.get(k).cloned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_yaml_file_with_env_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "quotes:\n  url: https://file.example.com/q.json\n  refresh_interval_ms: 5000\nmatrix:\n  homeserver: https://matrix.example.com\n  user_id: \"@bot:example.com\"\n  access_token: from-file\nreply:\n  prefix: \"!quote\"\n"
        )
        .unwrap();

        let mut config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.quotes.refresh_interval_ms, 5000);
        assert_eq!(config.reply.prefix, "!quote");
        assert_eq!(config.search.threshold, 0.8);

        let vars = env(&[(ENV_TOKEN, "from-env")]);
        config.apply_env(|k| vars.get(k).cloned());
        assert_eq!(config.matrix.access_token, "from-env");
        assert_eq!(config.quotes.url, "https://file.example.com/q.json");
        assert!(config.validate().is_ok());
    }
}
