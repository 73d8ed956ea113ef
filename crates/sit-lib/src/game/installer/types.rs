use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::game::installer::config::SUPPORT_LIBRARIES;
use crate::game::installer::patcher::PatchStep;
use crate::game::version::InstalledVersion;

/// Progress reporter trait for installer operations
/// Implementations forward updates to the UI/notification system
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total steps
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Update bytes transferred for download progress
    fn update_bytes(&self, transferred: u64, total: Option<u64>);

    /// Set overall percentage of the current step (0-100)
    fn set_percent(&self, percent: i32);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Set a numeric step count for the current step (e.g. "1/2" patches).
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Set a sub-step with optional name and progress
    /// (e.g. "Extracting StayInTarkov.dll (3/12)").
    fn set_substep(&self, name: Option<&str>, current: Option<u32>, total: Option<u32>);

    /// Mark operation as complete
    fn done(&self, success: bool, message: Option<&str>);
}

/// A progress reporter that does nothing (silent).
/// Useful for background verification or tests.
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
    fn set_percent(&self, _percent: i32) {}
    fn set_message(&self, _message: &str) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn set_substep(&self, _name: Option<&str>, _current: Option<u32>, _total: Option<u32>) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
}

/// A library shipped with the manager and written into the game's managed
/// assemblies after every install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportLibrary {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SupportLibrary {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Load the bundled `Aki.Common.dll` and `Aki.Reflection.dll` from `dir`.
    pub fn load_bundled(dir: &Path) -> Result<Vec<SupportLibrary>> {
        SUPPORT_LIBRARIES
            .iter()
            .map(|name| {
                let path = dir.join(name);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Read bundled library {:?}", path))?;
                Ok(SupportLibrary::new(*name, bytes))
            })
            .collect()
    }
}

/// Summary of a completed install
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Patch steps applied before the install, in order
    pub patches_applied: Vec<PatchStep>,
    /// Game version read back after patching
    pub game_version: Option<InstalledVersion>,
    /// SIT plugin version read back after the install
    pub mod_version: Option<InstalledVersion>,
    /// Server directory, for server installs
    pub server_path: Option<PathBuf>,
}
