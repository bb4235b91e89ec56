//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults are
//! the base layer; the user file overrides only the keys it names, and a few
//! environment variables override the store connection last.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [store]
//! url = "http://localhost:54321"  # PostgREST service root (no /rest/v1 suffix)
//! api_key = ""                    # Public (anon) API key sent with every request
//! fetch_limit = 1000              # Max rows the server returns per range request
//! timeout_secs = 30               # Per-request timeout
//!
//! [tables.images]
//! name = "images"
//! columns = "id, url"
//!
//! [tables.captions]
//! name = "captions"
//! columns = "content, image_id"
//!
//! [pagination]
//! page_size = 100                 # Items per gallery page
//! max_page_buttons = 5            # Width of the page-number window
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `GALLERY_STORE_URL` | `store.url` |
//! | `GALLERY_API_KEY` | `store.api_key` |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Environment variable overriding `store.url`.
pub const ENV_STORE_URL: &str = "GALLERY_STORE_URL";
/// Environment variable overriding `store.api_key`.
pub const ENV_API_KEY: &str = "GALLERY_API_KEY";

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Remote store connection.
    pub store: StoreConfig,
    /// Table names and column projections.
    pub tables: TablesConfig,
    /// Page size and navigation window.
    pub pagination: PaginationConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.store.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "store.url must be an http:// or https:// URL".into(),
            ));
        }
        if self.store.fetch_limit == 0 {
            return Err(ConfigError::Validation(
                "store.fetch_limit must be non-zero".into(),
            ));
        }
        if self.store.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "store.timeout_secs must be non-zero".into(),
            ));
        }
        for (key, table) in [
            ("tables.images", &self.tables.images),
            ("tables.captions", &self.tables.captions),
        ] {
            if table.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key}.name must not be empty"
                )));
            }
            if table.columns.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key}.columns must not be empty"
                )));
            }
        }
        if self.pagination.page_size == 0 {
            return Err(ConfigError::Validation(
                "pagination.page_size must be non-zero".into(),
            ));
        }
        if self.pagination.max_page_buttons == 0 {
            return Err(ConfigError::Validation(
                "pagination.max_page_buttons must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a configured URL.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_STORE_URL).filter(|v| !v.trim().is_empty()) {
            self.store.url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.store.api_key = key;
        }
    }
}

/// Remote store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Service root, e.g. `https://project.example.co`.
    pub url: String,
    /// Public API key, sent as `apikey` and as the fallback bearer token.
    pub api_key: String,
    /// Rows per range request. Must match the server's maximum: the reader
    /// stops at the first short page.
    pub fetch_limit: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            fetch_limit: 1000,
            timeout_secs: 30,
        }
    }
}

/// Name and column projection of one remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    /// PostgREST `select` projection, e.g. `"id, url"`.
    pub columns: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    pub images: TableConfig,
    pub captions: TableConfig,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            images: TableConfig {
                name: "images".to_string(),
                columns: "id, url".to_string(),
            },
            captions: TableConfig {
                name: "captions".to_string(),
                columns: "content, image_id".to_string(),
            },
        }
    }
}

/// Gallery paging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    pub page_size: usize,
    pub max_page_buttons: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_page_buttons: 5,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Load config from `path` with environment overrides applied.
///
/// A missing file yields the stock defaults. The result is validated after
/// the overrides so an env-supplied URL is checked too.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Caption Gallery Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Remote store
# ---------------------------------------------------------------------------
[store]
# Service root. Tables are read from <url>/rest/v1/<table>, the signed-in
# user from <url>/auth/v1/user. Overridden by GALLERY_STORE_URL.
url = "http://localhost:54321"

# Public (anon) API key. Overridden by GALLERY_API_KEY.
api_key = ""

# Rows per range request. Set this to the server's row cap: reading a table
# stops at the first response shorter than this.
fetch_limit = 1000

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Tables
# ---------------------------------------------------------------------------
[tables.images]
name = "images"
columns = "id, url"

[tables.captions]
name = "captions"
columns = "content, image_id"

# ---------------------------------------------------------------------------
# Pagination
# ---------------------------------------------------------------------------
[pagination]
# Items shown per page.
page_size = 100

# Page-number buttons in the navigation window (first and last page are
# always reachable on top of these).
max_page_buttons = 5
"##
}
