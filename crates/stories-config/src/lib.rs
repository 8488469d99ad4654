//! Configuration management for the story renderer.
//!
//! Parses `stories.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.publisher_logo`
//! - `analytics.property_id`
//! - `analytics.tracking_id`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override site language.
    pub lang: Option<String>,
    /// Override right-to-left flag.
    pub rtl: Option<bool>,
    /// Override publisher logo URL.
    pub publisher_logo: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "stories.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide render facts.
    pub site: SiteConfig,
    /// Analytics integration (optional section).
    /// When absent, no built-in analytics tag is rendered.
    pub analytics: Option<AnalyticsConfig>,
    /// Static markup snippets spliced into rendered stories.
    pub snippets: SnippetsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Version reported in the generator meta tag.
    pub version: String,
    /// Publisher logo URL substituted for the editor's placeholder.
    pub publisher_logo: Option<String>,
    /// Language tag for the `<html>` element (e.g., `en-US`).
    pub lang: Option<String>,
    /// Whether the site language is right-to-left.
    pub rtl: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            publisher_logo: None,
            lang: None,
            rtl: false,
        }
    }
}

/// Analytics configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Web property ID from the analytics settings.
    pub property_id: Option<String>,
    /// Explicit tracking ID; wins over `property_id` when non-empty.
    pub tracking_id: Option<String>,
    /// Set to `false` to disable the built-in analytics tag.
    pub use_snippet: Option<bool>,
    /// Viewer classes excluded from tracking (e.g., `loggedinUsers`).
    pub tracking_disabled: Vec<String>,
}

/// Static markup contributed to rendered stories.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnippetsConfig {
    /// Markup appended to the generated `<head>` region.
    pub head: Vec<String>,
    /// Markup placed right after `<body>`.
    pub body_open: Vec<String>,
    /// Markup placed right before `</body>`.
    pub footer: Vec<String>,
    /// Analytics markup placed before `</amp-story>`.
    pub analytics: Vec<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`analytics.tracking_id`").
        field: String,
        /// Error message (e.g., "${`GTAG_ID`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `stories.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(lang) = &settings.lang {
            self.site.lang = Some(lang.clone());
        }
        if let Some(rtl) = settings.rtl {
            self.site.rtl = rtl;
        }
        if let Some(logo) = &settings.publisher_logo {
            self.site.publisher_logo = Some(logo.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(&current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.version, "site.version")?;
        if let Some(ref logo) = self.site.publisher_logo {
            require_non_empty(logo, "site.publisher_logo")?;
            require_http_url(logo, "site.publisher_logo")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.site.publisher_logo, "site.publisher_logo")?;

        if let Some(ref mut analytics) = self.analytics {
            expand::expand_opt(&mut analytics.property_id, "analytics.property_id")?;
            expand::expand_opt(&mut analytics.tracking_id, "analytics.tracking_id")?;
        }

        Ok(())
    }
}
