//! Site configuration.
//!
//! Handles loading and validating `config.toml`. Stock defaults are
//! overridden by the user's config file, which is in turn overridden by
//! command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! data_dir = "data"                        # Archive of comment JSON files
//! output_dir = "dist"                      # Generated site
//! images_dir = "images"                    # Pre-downloaded card images
//! base_url = ""                            # e.g. "https://example.org/archive"
//! name_map = "cache/card_name_map.json"    # Card name -> identifier
//! metadata = "cache/scryfall_data.json"    # Identifier -> set/artist/oracle id
//! site_title = "Card Comment Archive"
//! # assets_dir = "assets"                  # Extra files copied into static/
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! base_url = "https://example.org/archive/"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
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

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the archived comment files.
    pub data_dir: PathBuf,
    /// Where the generated site is written.
    pub output_dir: PathBuf,
    /// Directory of card images named `<id>.<ext>`.
    pub images_dir: PathBuf,
    /// Absolute site URL for the sitemap. Empty keeps links site-relative.
    pub base_url: String,
    /// Cached card name -> identifier map.
    pub name_map: PathBuf,
    /// Cached identifier -> metadata map.
    pub metadata: PathBuf,
    /// Title shown on the index page and in page titles.
    pub site_title: String,
    /// Optional directory whose contents are copied into `static/`.
    pub assets_dir: Option<PathBuf>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("dist"),
            images_dir: PathBuf::from("images"),
            base_url: String::new(),
            name_map: PathBuf::from("cache/card_name_map.json"),
            metadata: PathBuf::from("cache/scryfall_data.json"),
            site_title: "Card Comment Archive".to_string(),
            assets_dir: None,
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("data_dir must not be empty".into()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output_dir must not be empty".into()));
        }
        let url = self.base_url.as_str();
        if !(url.is_empty()
            || url.starts_with("http://")
            || url.starts_with("https://")
            || url.starts_with('/'))
        {
            return Err(ConfigError::Validation(format!(
                "base_url must be empty, absolute (http/https) or start with '/': {url}"
            )));
        }
        Ok(())
    }

    /// Apply command-line overrides and normalize the base URL.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = overrides.images_dir {
            self.images_dir = dir;
        }
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        self.base_url = normalize_base_url(&self.base_url);
        self
    }
}

/// Values supplied on the command line; `None` keeps the config value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Strip surrounding whitespace and trailing slashes.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Load config from `path`, falling back to stock defaults when absent.
///
/// Every key is optional; `#[serde(default)]` fills in whatever the file
/// leaves out.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Card comment archive configuration
# ==================================
# All settings are optional. Values shown below are the defaults.
# Command-line flags (--data, --output, --images, --base-url) win over
# anything set here. Unknown keys will cause an error.

# Directory of archived comment files. Every *.json file below it is read;
# each maps a printing identifier to { "name": ..., "comments": [...] }.
data_dir = "data"

# Where the generated site is written.
output_dir = "dist"

# Pre-downloaded card images, one per printing, named <id>.webp (preferred),
# <id>.jpg, <id>.jpeg, <id>.png or <id>.gif.
images_dir = "images"

# Absolute URL the site is published under. Used for sitemap entries.
# Leave empty for site-relative links. A trailing slash is ignored.
base_url = ""

# Cached lookups produced by the metadata fetcher.
name_map = "cache/card_name_map.json"
metadata = "cache/scryfall_data.json"

# Title shown on the index page.
site_title = "Card Comment Archive"

# Extra static files (favicon, fonts) copied verbatim into static/.
# assets_dir = "assets"
"##
}
