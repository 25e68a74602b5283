use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::Url;
use std::collections::HashMap;
use std::env;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

static BUNDLED_DEFAULTS: OnceCell<HashMap<String, String>> = OnceCell::new();

/// `KEY=VALUE` pairs from an env file; blank lines and `#` comments are skipped.
pub fn parse_env_file(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Registers fallback values for targets without a process environment.
/// Only the first call has any effect.
pub fn install_bundled_defaults(text: &str) {
    if BUNDLED_DEFAULTS
        .set(parse_env_file(text).into_iter().collect())
        .is_err()
    {
        tracing::debug!("bundled config already installed");
    }
}

/// The process environment first, then any bundled default.
fn setting(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .or_else(|| BUNDLED_DEFAULTS.get()?.get(key).cloned())
        .filter(|value| !value.trim().is_empty())
}

/// Connection settings for the chat API.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Sent as `x-api-key` on login, which the server gates behind a key.
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid API base URL: {base_url}"))?;
        Ok(Self {
            base_url,
            api_key: None,
        })
    }

    /// Reads `CHATAPP_API_BASE` and `CHATAPP_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let base = setting("CHATAPP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mut config = Self::new(&base)?;
        config.api_key = setting("CHATAPP_API_KEY");
        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Joins `path` onto the base URL, keeping any path prefix the base has.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            api_key: None,
        }
    }
}
