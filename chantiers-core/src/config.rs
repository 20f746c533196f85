//! Configuration shared by the worksite tools

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "chantiers.toml";

/// Placeholder replaced by the cable capacity in cable type templates
pub const CAPA_PLACEHOLDER: &str = "{capa}";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChantierConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    /// Cable type template by destination box type (e.g. "CABLE_{capa}FO_AER")
    #[serde(default)]
    pub cable_types: BTreeMap<String, String>,
}

impl ChantierConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ChantierConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the given file, else `chantiers.toml` from the working directory if present,
    /// else the defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let config = if let Some(config_path) = explicit {
            Self::from_file(config_path)
                .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        } else {
            let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_config_path.exists() {
                Self::from_file(&default_config_path).with_context(|| {
                    format!(
                        "Failed to load config from {}",
                        default_config_path.display()
                    )
                })?
            } else {
                Self::default()
            }
        };
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.global.love_length < 0 {
            anyhow::bail!(
                "Configuration error: love_length must not be negative (got {})",
                self.global.love_length
            );
        }
        if self.global.bpe_file_marker.is_empty() {
            anyhow::bail!("Configuration error: bpe_file_marker must not be empty");
        }
        for (box_type, template) in &self.cable_types {
            if !template.contains(CAPA_PLACEHOLDER) {
                anyhow::bail!(
                    "Configuration error: cable type '{}' for box type '{}' has no {} placeholder",
                    template,
                    box_type,
                    CAPA_PLACEHOLDER
                );
            }
        }
        Ok(())
    }

    /// Cable type for a cable of the given capacity ending in the given box type
    pub fn cable_type(&self, dest_box_type: &str, capa: usize) -> Option<String> {
        self.cable_types
            .get(dest_box_type)
            .filter(|template| !template.is_empty())
            .map(|template| template.replace(CAPA_PLACEHOLDER, &capa.to_string()))
    }
}

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default love (slack) length in meters added per troncon
    #[serde(default = "default_love_length")]
    pub love_length: i64,
    /// Splice plan files are the xlsx files whose name contains this marker
    #[serde(default = "default_bpe_file_marker")]
    pub bpe_file_marker: String,
    /// ZACABLE workbooks are the xlsx files whose name starts with this prefix
    #[serde(default = "default_zacable_file_prefix")]
    pub zacable_file_prefix: String,
    /// Extension of measurement workbooks
    #[serde(default = "default_measure_extension")]
    pub measure_extension: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            love_length: default_love_length(),
            bpe_file_marker: default_bpe_file_marker(),
            zacable_file_prefix: default_zacable_file_prefix(),
            measure_extension: default_measure_extension(),
        }
    }
}

fn default_love_length() -> i64 {
    20
}

fn default_bpe_file_marker() -> String {
    "PT".to_string()
}

fn default_zacable_file_prefix() -> String {
    "ZACABLE".to_string()
}

fn default_measure_extension() -> String {
    ".xlsx".to_string()
}
