//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::constants::template::BUILTIN_NAME;
use crate::error::Result;
use crate::types::NotationStyle;

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Chord spelling convention
    pub notation: NotationStyle,
    /// Template name (looked up in `template_dirs`) or path
    pub template: String,
    /// Directories searched for named templates
    pub template_dirs: Vec<PathBuf>,
    /// Where generated documents go; `None` writes next to each input
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            notation: NotationStyle::default(),
            template: BUILTIN_NAME.to_string(),
            template_dirs: Vec::new(),
            output_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(style) = env::var("SONGSHEET_NOTATION") {
            config.notation = style.parse()?;
        }

        if let Ok(template) = env::var("SONGSHEET_TEMPLATE") {
            config.template = template;
        }

        // Template dir: env var override, then the platform config dir if present
        if let Ok(dir) = env::var("SONGSHEET_TEMPLATE_DIR") {
            config.template_dirs.push(expand_path(&dir));
        }
        if let Some(dir) = default_template_dir() {
            config.template_dirs.push(dir);
        }

        config.output_dir = env::var("SONGSHEET_OUTPUT_DIR").ok().map(|dir| expand_path(&dir));

        Ok(config)
    }
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

/// `~/.config/songsheet/templates` (or the platform equivalent), if it exists
fn default_template_dir() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("songsheet").join("templates"))
        .filter(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_use_builtin_template() {
        let config = Config::default();
        assert_eq!(config.template, BUILTIN_NAME);
        assert_eq!(config.notation, NotationStyle::Compact);
        assert!(config.output_dir.is_none());
        assert_eq!(config.app_name(), "songsheet");
    }

    #[test]
    fn expand_path_resolves_tilde() {
        let expanded = expand_path("~/songs");
        assert!(!expanded.to_string_lossy().starts_with('~') || dirs::home_dir().is_none());
        assert_eq!(expand_path("/abs/songs"), PathBuf::from("/abs/songs"));
    }
}
