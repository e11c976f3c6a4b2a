use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::session::Surface;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub default_surface: Surface,
    /// Read catalogs from this directory instead of the bundled copies.
    #[serde(default)]
    pub catalog_dir: Option<String>,
    /// Fetch catalogs from `<catalog_url>/<kind>.json`, cached on disk.
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default = "default_speech_enabled")]
    pub speech_enabled: bool,
    #[serde(default)]
    pub speech_command: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed RNG seed; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_speech_enabled() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_surface: Surface::default(),
            catalog_dir: None,
            catalog_url: None,
            speech_enabled: default_speech_enabled(),
            speech_command: None,
            log_level: default_log_level(),
            seed: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::parse(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse a config file. An unknown `default_surface` falls back to the
    /// default rather than rejecting the whole file.
    pub fn parse(content: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;
        if let Some(value) = table.get("default_surface")
            && value
                .as_str()
                .is_none_or(|name| Surface::from_name(name).is_none())
        {
            warn!("unknown default_surface {value}, using kana");
            table.remove("default_surface");
        }
        Ok(table.try_into()?)
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadr")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn catalog_dir(&self) -> Option<PathBuf> {
        self.catalog_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Reset values that no longer name anything real. Call after
    /// deserialization and after applying CLI overrides.
    pub fn normalize(&mut self, valid_themes: &[&str]) {
        if !valid_themes.contains(&self.theme.as_str()) {
            warn!("unknown theme {}, using {}", self.theme, default_theme());
            self.theme = default_theme();
        }
        self.log_level = self.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = default_log_level();
        }
        if self
            .catalog_url
            .as_deref()
            .is_some_and(|u| u.trim().is_empty())
        {
            self.catalog_url = None;
        }
    }
}
