use std::path::{Path, PathBuf};

use crate::game::installer::config::*;

/// Fixed locations inside a game installation.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn battleye_exe(&self) -> PathBuf {
        self.root.join(BATTLEYE_EXE)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join("BepInEx").join("plugins")
    }

    pub fn managed_dir(&self) -> PathBuf {
        self.root.join("EscapeFromTarkov_Data").join("Managed")
    }

    pub fn launcher_dir(&self) -> PathBuf {
        self.root.join("SITLauncher")
    }

    pub fn core_files_dir(&self) -> PathBuf {
        self.launcher_dir().join("CoreFiles")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.launcher_dir().join("Backup").join("CoreFiles")
    }

    pub fn bepinex_archive(&self) -> PathBuf {
        self.launcher_dir().join(BEPINEX_ARCHIVE)
    }

    /// Directory the mod release archive extracts into
    pub fn release_dir(&self) -> PathBuf {
        let stem = SIT_RELEASE_ASSET.trim_end_matches(".zip");
        self.core_files_dir().join(stem)
    }

    pub fn patcher_archive(&self) -> PathBuf {
        self.root.join(PATCHER_ARCHIVE)
    }

    pub fn patcher_exe(&self) -> PathBuf {
        self.root.join(PATCHER_EXE)
    }

    pub fn patcher_log(&self) -> PathBuf {
        self.root.join(PATCHER_LOG)
    }

    pub fn patcher_scratch_dir(&self) -> PathBuf {
        self.root.join(PATCHER_SCRATCH_DIR)
    }

    /// Server installs go next to the game directory, not inside it.
    pub fn server_dir(&self) -> PathBuf {
        match self.root.parent() {
            Some(parent) => parent.join(SERVER_DIR),
            None => self.root.join(SERVER_DIR),
        }
    }
}
