use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manager settings the install engine reads and updates.
///
/// The engine never persists this itself; every change it wants kept is
/// handed to a [`ConfigStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Root of the game installation
    pub install_path: Option<PathBuf>,
    /// Root of the SPT-AKI server installation
    pub aki_server_path: Option<PathBuf>,
    /// Installed game version, e.g. `0.14.1.2.29197`
    pub tarkov_version: Option<String>,
    /// Installed SIT plugin version, e.g. `1.10.8869.29197`
    pub sit_version: Option<String>,
}

impl ManagerConfig {
    /// The configured install path, ignoring an empty value.
    pub fn install_path(&self) -> Option<&Path> {
        self.install_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

/// Persistence for [`ManagerConfig`]. Saving is fire-and-forget: failures are
/// the store's business to log.
pub trait ConfigStore: Send + Sync {
    fn save(&self, config: &ManagerConfig);
}

/// A store that keeps nothing.
pub struct NoopConfigStore;

impl ConfigStore for NoopConfigStore {
    fn save(&self, _config: &ManagerConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_install_path_counts_as_unset() {
        let mut config = ManagerConfig::default();
        assert!(config.install_path().is_none());

        config.install_path = Some(PathBuf::new());
        assert!(config.install_path().is_none());

        config.install_path = Some(PathBuf::from("/games/eft"));
        assert_eq!(config.install_path(), Some(Path::new("/games/eft")));
    }

    #[test]
    fn missing_fields_default_when_loading() {
        let config: ManagerConfig =
            serde_json::from_str(r#"{"install_path":"/games/eft"}"#).unwrap();
        assert_eq!(config.install_path(), Some(Path::new("/games/eft")));
        assert!(config.tarkov_version.is_none());
    }
}
