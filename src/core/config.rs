//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

/// Environment variable overriding `user_name`
pub const USER_ENV: &str = "CHEMPROV_USER";

/// Environment variable overriding `default_format`
pub const FORMAT_ENV: &str = "CHEMPROV_FORMAT";

/// ChemProV configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Author credited with unattributed comments in the parent document
    pub user_name: Option<String>,

    /// Author credited with unattributed comments in child documents
    pub child_user_name: Option<String>,

    /// Default output format for listings
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/chemprov/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match std::fs::read_to_string(&global_path)
                    .map_err(|e| e.to_string())
                    .and_then(|contents| Self::from_yaml(&contents))
                {
                    Ok(global) => config.merge(global),
                    Err(e) => warn!(path = %global_path.display(), "ignoring config file: {e}"),
                }
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env(|key| std::env::var(key).ok()));

        config
    }

    /// Parse a config file; an empty file is an empty config
    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| e.to_string())
    }

    fn from_env(var: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            user_name: var(USER_ENV),
            child_user_name: None,
            default_format: var(FORMAT_ENV),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chemprov")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user_name.is_some() {
            self.user_name = other.user_name;
        }
        if other.child_user_name.is_some() {
            self.child_user_name = other.child_user_name;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Look up a value by its key name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "user_name" => self.user_name.as_deref(),
            "child_user_name" => self.child_user_name.as_deref(),
            "default_format" => self.default_format.as_deref(),
            _ => None,
        }
    }
}
