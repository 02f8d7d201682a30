//! Settings module for subpanel
//!
//! Settings are read from a single TOML or YAML file, picked by extension.
//! Every field has a default, so a missing file or a partial one is fine.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::{FirstShortId, RandomShortId, ShortIdSelector};
use crate::interfaces::SiteConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported settings file extension: {0}")]
    UnsupportedExtension(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_max_concur_threads")]
    pub max_concur_threads: usize,

    /// Display name, also the base of download filenames
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Advertised to Clash and Surge as the profile web page
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default = "default_update_interval_hours")]
    pub update_interval_hours: u32,

    /// Path of the user/node data file
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Pick a random Reality short-id per render instead of the first one
    #[serde(default = "default_true")]
    pub randomize_short_id: bool,
}

// Default value functions for serde
fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

fn default_listen_port() -> u16 {
    25500
}

fn default_max_concur_threads() -> usize {
    4
}

fn default_site_name() -> String {
    "Subscription".to_string()
}

fn default_update_interval_hours() -> u32 {
    24
}

fn default_data_path() -> String {
    "data.yaml".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            max_concur_threads: default_max_concur_threads(),
            site_name: default_site_name(),
            site_url: None,
            update_interval_hours: default_update_interval_hours(),
            data_path: default_data_path(),
            randomize_short_id: default_true(),
        }
    }
}

impl Settings {
    /// Parse settings text; `extension` selects the format
    pub fn from_str_with_extension(content: &str, extension: &str) -> Result<Self, SettingsError> {
        match extension.to_lowercase().as_str() {
            "toml" => Ok(toml::from_str(content)?),
            "yaml" | "yml" => {
                if content.trim().is_empty() {
                    Ok(Settings::default())
                } else {
                    Ok(serde_yaml::from_str(content)?)
                }
            }
            other => Err(SettingsError::UnsupportedExtension(other.to_string())),
        }
    }

    /// Load settings from `path`, falling back to defaults when it does not exist
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                "Settings file {} not found, using defaults",
                path.display()
            );
            return Ok(Settings::default());
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let content = fs::read_to_string(path)?;
        let settings = Self::from_str_with_extension(&content, extension)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Short-id selector matching `randomize_short_id`
    pub fn short_id_selector(&self) -> Box<dyn ShortIdSelector> {
        if self.randomize_short_id {
            Box::new(RandomShortId)
        } else {
            Box::new(FirstShortId)
        }
    }
}

impl SiteConfig for Settings {
    fn site_name(&self) -> &str {
        &self.site_name
    }

    fn site_url(&self) -> Option<&str> {
        self.site_url.as_deref()
    }

    fn update_interval_hours(&self) -> u32 {
        self.update_interval_hours
    }
}
