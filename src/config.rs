//! Site configuration module.
//!
//! Handles loading, validating and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is deep-merged on top, so a
//! config file only needs the keys it wants to change. Connection credentials
//! can also come from the environment, which wins over the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [prismic]
//! endpoint = "https://spacetraveling.cdn.prismic.io/api/v2"
//! access_token = ""         # Empty = public repository
//! document_type = "posts"
//! timeout_secs = 10         # Per-request timeout
//!
//! [listing]
//! page_size = 1             # Posts per "load more" step
//! max_pages = 50            # Upper bound for /?pages=N
//!
//! [build]
//! prerender = 20            # Posts rendered at build time (0 = none)
//!
//! [serve]
//! bind = "127.0.0.1:3000"
//! revalidate_secs = 3600    # Home page refresh period
//!
//! [site]
//! title = "spacetraveling"
//! lang = "pt-BR"
//!
//! [colors.light]
//! background = "#ffffff"
//! ...
//!
//! [colors.dark]
//! background = "#1a1d23"
//! ...
//! ```
//!
//! ## Environment
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `PRISMIC_API_ENDPOINT` | `prismic.endpoint` |
//! | `PRISMIC_ACCESS_TOKEN` | `prismic.access_token` |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Largest page size the content API accepts.
pub const MAX_API_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content API connection.
    pub prismic: PrismicConfig,
    /// List page pagination.
    pub listing: ListingConfig,
    /// Build-time generation.
    pub build: BuildConfig,
    /// Request-time server.
    pub serve: ServeConfig,
    /// Page metadata.
    pub site: SiteMeta,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prismic.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "prismic.endpoint must not be empty".into(),
            ));
        }
        if self.prismic.document_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "prismic.document_type must not be empty".into(),
            ));
        }
        if self.prismic.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "prismic.timeout_secs must be positive".into(),
            ));
        }
        if !(1..=MAX_API_PAGE_SIZE).contains(&self.listing.page_size) {
            return Err(ConfigError::Validation(format!(
                "listing.page_size must be 1-{MAX_API_PAGE_SIZE}"
            )));
        }
        if self.listing.max_pages == 0 {
            return Err(ConfigError::Validation(
                "listing.max_pages must be at least 1".into(),
            ));
        }
        if self.build.prerender > MAX_API_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "build.prerender must be 0-{MAX_API_PAGE_SIZE}"
            )));
        }
        if self.serve.revalidate_secs == 0 {
            return Err(ConfigError::Validation(
                "serve.revalidate_secs must be positive".into(),
            ));
        }
        if self.serve.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "serve.bind is not a socket address: {}",
                self.serve.bind
            )));
        }
        Ok(())
    }

    /// Apply `PRISMIC_*` environment overrides through `lookup`.
    ///
    /// Takes a lookup function so tests don't have to mutate the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PRISMIC_API_ENDPOINT").filter(|v| !v.is_empty()) {
            self.prismic.endpoint = endpoint;
        }
        if let Some(token) = lookup("PRISMIC_ACCESS_TOKEN") {
            self.prismic.access_token = token;
        }
    }

    /// Parsed `serve.bind`. Valid after [`validate`](Self::validate).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.serve
            .bind
            .parse()
            .map_err(|_| ConfigError::Validation(format!("invalid serve.bind: {}", self.serve.bind)))
    }
}

/// Content API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrismicConfig {
    /// API root, e.g. `https://<repo>.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    /// Access token for private repositories; empty for public ones.
    pub access_token: String,
    /// Custom type holding blog posts.
    pub document_type: String,
    /// Timeout applied to every API request.
    pub timeout_secs: u64,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: String::new(),
            document_type: "posts".to_string(),
            timeout_secs: 10,
        }
    }
}

/// List page pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Posts fetched per page; each "load more" adds one page.
    pub page_size: u32,
    /// Largest `pages` value honored on the list route.
    pub max_pages: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 1,
            max_pages: 50,
        }
    }
}

/// Build-time generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Number of most recent posts rendered ahead of time. Others are
    /// generated on first request by the server.
    pub prerender: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { prerender: 20 }
    }
}

/// Request-time server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Listen address.
    pub bind: String,
    /// Seconds between home page refreshes.
    pub revalidate_secs: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            revalidate_secs: 60 * 60,
        }
    }
}

/// Page metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    /// Site name, used in `<title>`.
    pub title: String,
    /// `lang` attribute of generated pages.
    pub lang: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            lang: "pt-BR".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Titles and headings.
    pub heading: String,
    /// Body text.
    pub text: String,
    /// Post metadata (date, author, reading time).
    pub info: String,
    /// Links and the "load more" control.
    pub highlight: String,
    /// Separators.
    pub border: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            heading: "#1a1d23".to_string(),
            text: "#3a3d43".to_string(),
            info: "#6b6e74".to_string(),
            highlight: "#d6338f".to_string(),
            border: "#e0e0e0".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1a1d23".to_string(),
            heading: "#f8f8f8".to_string(),
            text: "#bbbbbb".to_string(),
            info: "#d7d7d7".to_string(),
            highlight: "#ff57b2".to_string(),
            border: "#2c2f36".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys, applies
/// environment overrides, and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    let mut config = resolve_config(base, overlay)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# spacetraveling configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[prismic]
# API root of the Prismic repository.
# Overridden by the PRISMIC_API_ENDPOINT environment variable.
endpoint = "https://spacetraveling.cdn.prismic.io/api/v2"

# Access token for private repositories. Leave empty for public ones.
# Overridden by the PRISMIC_ACCESS_TOKEN environment variable.
access_token = ""

# Custom type that holds blog posts.
document_type = "posts"

# Timeout for each API request, in seconds.
timeout_secs = 10

# ---------------------------------------------------------------------------
# List page
# ---------------------------------------------------------------------------
[listing]
# Posts per page. Each "load more" click adds one page.
page_size = 1

# Largest number of pages the list route will accumulate (/?pages=N).
max_pages = 50

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Number of most recent posts rendered at build time (0-100).
# Other posts are generated on first request by `serve`.
prerender = 20

# ---------------------------------------------------------------------------
# Server
# ---------------------------------------------------------------------------
[serve]
# Listen address for `serve`.
bind = "127.0.0.1:3000"

# Seconds between background refreshes of the home page.
revalidate_secs = 3600

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "spacetraveling"
lang = "pt-BR"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
heading = "#1a1d23"
text = "#3a3d43"
info = "#6b6e74"          # Date, author, reading time
highlight = "#d6338f"     # Links, "load more"
border = "#e0e0e0"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1a1d23"
heading = "#f8f8f8"
text = "#bbbbbb"
info = "#d7d7d7"
highlight = "#ff57b2"
border = "#2c2f36"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-heading: {light_heading};
    --color-text: {light_text};
    --color-info: {light_info};
    --color-highlight: {light_highlight};
    --color-border: {light_border};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-heading: {dark_heading};
        --color-text: {dark_text};
        --color-info: {dark_info};
        --color-highlight: {dark_highlight};
        --color-border: {dark_border};
    }}
}}"#,
        light_bg = colors.light.background,
        light_heading = colors.light.heading,
        light_text = colors.light.text,
        light_info = colors.light.info,
        light_highlight = colors.light.highlight,
        light_border = colors.light.border,
        dark_bg = colors.dark.background,
        dark_heading = colors.dark.heading,
        dark_text = colors.dark.text,
        dark_info = colors.dark.info,
        dark_highlight = colors.dark.highlight,
        dark_border = colors.dark.border,
    )
}
