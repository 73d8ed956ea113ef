use anyhow::Result;
use std::fmt;
use std::path::Path;

use crate::game::installer::config::PATCHER_ARG;
use crate::game::installer::core::fs::{remove_dir_if_exists, remove_file_if_exists};
use crate::game::installer::core::traits::PatcherLauncher;
use crate::game::installer::layout::InstallLayout;

/// Result of one patcher run, decoded from its exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatcherOutcome {
    NotFound,
    UserCancelled,
    Success,
    MissingTarget,
    MissingPatchData,
    MissingInstallFile,
    MissingInstallFolder,
    Failed,
    Unknown(Option<i32>),
}

impl PatcherOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => PatcherOutcome::UserCancelled,
            Some(10) => PatcherOutcome::Success,
            Some(11) => PatcherOutcome::MissingTarget,
            Some(12) => PatcherOutcome::MissingPatchData,
            Some(13) => PatcherOutcome::MissingInstallFile,
            Some(14) => PatcherOutcome::MissingInstallFolder,
            Some(15) => PatcherOutcome::Failed,
            other => PatcherOutcome::Unknown(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PatcherOutcome::Success)
    }

    pub fn message(&self) -> &'static str {
        match self {
            PatcherOutcome::NotFound => "Patcher.exe was not found.",
            PatcherOutcome::UserCancelled => "Patcher was closed.",
            PatcherOutcome::Success => "Patcher was successful.",
            PatcherOutcome::MissingTarget => "Could not find 'EscapeFromTarkov.exe'.",
            PatcherOutcome::MissingPatchData => "'Aki_Patches' is missing.",
            PatcherOutcome::MissingInstallFile => "Install folder is missing a file.",
            PatcherOutcome::MissingInstallFolder => "Install folder is missing a folder.",
            PatcherOutcome::Failed => "Patcher failed.",
            PatcherOutcome::Unknown(_) => "Unknown error.",
        }
    }
}

impl fmt::Display for PatcherOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Run `Patcher.exe` from `install_path` and decode how it exited.
///
/// On success the patcher binary, its log and its scratch directory are
/// removed. Any other outcome leaves the tree as the patcher left it.
pub async fn run_patcher(
    launcher: &dyn PatcherLauncher,
    install_path: &Path,
) -> Result<PatcherOutcome> {
    let layout = InstallLayout::new(install_path);
    let exe = layout.patcher_exe();
    if !exe.exists() {
        log::error!("Patcher not found at {:?}", exe);
        return Ok(PatcherOutcome::NotFound);
    }

    let code = launcher.launch(&exe, install_path, &[PATCHER_ARG]).await?;
    let outcome = PatcherOutcome::from_exit_code(code);
    log::info!("Patcher exited with {:?}: {}", code, outcome);

    if outcome.is_success() {
        remove_file_if_exists(&exe)?;
        remove_file_if_exists(&layout.patcher_log())?;
        remove_dir_if_exists(&layout.patcher_scratch_dir())?;
    }
    Ok(outcome)
}
