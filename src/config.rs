use crate::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tapp_import_common::NormalizeOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Warn about spreadsheet columns that match no field
    pub log_unrecognized_headers: bool,
    /// Report every missing required field instead of stopping at the first
    pub collect_all_missing: bool,
    /// Snapshot used by `preview` when none is given on the command line
    pub snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_unrecognized_headers: true,
            collect_all_missing: false,
            snapshot: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImportError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("tapp-import").join("config.json"))
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            log_unrecognized_headers: self.log_unrecognized_headers,
            collect_all_missing: self.collect_all_missing,
        }
    }
}
