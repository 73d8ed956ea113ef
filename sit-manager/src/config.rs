//! Config persistence for the command-line front end.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use sit_lib::{ConfigStore, ManagerConfig};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "ManagerConfig.json";

/// Get the manager's config directory, creating it if needed.
pub fn get_app_config_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "stayintarkov", "sit-manager")
        .ok_or_else(|| anyhow::anyhow!("Failed to determine user's config directory"))?;
    let config_dir = project_dirs.config_dir().to_path_buf();

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }
    Ok(config_dir)
}

/// Keeps [`ManagerConfig`] as pretty-printed JSON in one file.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config. A missing file yields the defaults.
    pub fn load(&self) -> Result<ManagerConfig> {
        if !self.path.exists() {
            log::info!("No config at {:?}, using defaults", self.path);
            return Ok(ManagerConfig::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Read config {:?}", self.path))?;
        serde_json::from_str(&raw).with_context(|| format!("Parse config {:?}", self.path))
    }

    fn write(&self, config: &ManagerConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Write config {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Replace config {:?}", self.path))?;
        Ok(())
    }
}

impl ConfigStore for JsonConfigStore {
    fn save(&self, config: &ManagerConfig) {
        match self.write(config) {
            Ok(()) => log::debug!("Saved config to {:?}", self.path),
            Err(e) => log::error!("Failed to save config: {:#}", e),
        }
    }
}
