//! Configuration file parser for ~/.config/briefly/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning for each one
//! to surface typos. Environment variables override file values.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::reader::DEFAULT_ARTICLE_LIMIT;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks the anon key and access token.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`.
    pub supabase_url: Option<String>,

    /// Public anon key sent as `apikey` on every request.
    pub supabase_anon_key: Option<String>,

    /// Access token of the signed-in user. Falls back to the anon key.
    pub access_token: Option<String>,

    /// Signed-in user id; saved articles are only read when this is set.
    pub user_id: Option<String>,

    /// Maximum articles requested per list or search.
    pub article_limit: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Cache database location. Defaults to `cache.db` in the config directory.
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            access_token: None,
            user_id: None,
            article_limit: DEFAULT_ARTICLE_LIMIT,
            request_timeout_secs: 20,
            database_path: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_anon_key",
                &self.supabase_anon_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_id", &self.user_id)
            .field("article_limit", &self.article_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("database_path", &self.database_path)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "supabase_url",
        "supabase_anon_key",
        "access_token",
        "user_id",
        "article_limit",
        "request_timeout_secs",
        "database_path",
    ];

    /// Load configuration from a TOML file.
    ///
    /// A missing or blank file yields the defaults. Unknown keys are accepted
    /// and logged; invalid TOML is an error carrying the line number.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = Self::read_bounded(path)? else {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let table: toml::Table = toml::from_str(&content)?;
        for key in table.keys().filter(|k| !Self::KNOWN_KEYS.contains(&k.as_str())) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            backend = config.supabase_url.as_deref().unwrap_or("<unset>"),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// File contents, `None` if the file does not exist. Oversized files are
    /// rejected before they are read.
    fn read_bounded(path: &Path) -> Result<Option<String>, ConfigError> {
        let not_found = |e: &std::io::Error| e.kind() == std::io::ErrorKind::NotFound;

        let len = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if not_found(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if len > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} is {len} bytes (max {} bytes)",
                path.display(),
                Self::MAX_FILE_SIZE
            )));
        }

        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides. Set, non-blank variables win over the file.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SUPABASE_URL") {
            self.supabase_url = Some(url);
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.supabase_anon_key = Some(key);
        }
        if let Some(token) = get("BRIEFLY_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(user) = get("BRIEFLY_USER_ID") {
            self.user_id = Some(user);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================
