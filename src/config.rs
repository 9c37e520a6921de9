//! Client-local preferences persisted between runs.

use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Display theme. Restored at bootstrap; toggled from the REPL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            server_url: default_server_url(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load the persisted config, writing defaults on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("", "", "parley")
            .ok_or_else(|| ConfigError::Load("cannot determine a config directory".into()))?;
        Self::load_or_init_at(&dirs.config_dir().join("config.toml"))
    }

    /// Same as [`Config::load_or_init`] against an explicit path.
    pub fn load_or_init_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&contents)?;
            config.config_path = path.to_path_buf();
            return Ok(config);
        }

        let config = Config {
            config_path: path.to_path_buf(),
            ..Config::default()
        };
        config.save()?;
        Ok(config)
    }

    /// Persist the current preferences.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)?;
        fs::write(&self.config_path, rendered)?;
        Ok(())
    }

    /// Flip the theme and persist it immediately.
    pub fn toggle_theme(&mut self) -> Result<Theme, ConfigError> {
        self.theme = self.theme.toggled();
        self.save()?;
        Ok(self.theme)
    }
}
