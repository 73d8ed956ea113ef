//! Removal of anti-cheat leftovers that keep the modded client from starting.

use std::path::Path;

use crate::game::installer::core::fs::{remove_dir_if_exists, remove_file_if_exists};
use crate::game::installer::layout::InstallLayout;

const BATTLEYE_DIRS: [&str; 3] = ["BattlEye", "cache", "Logs"];
const BATTLEYE_FILES: [&str; 3] = ["EscapeFromTarkov_BE.exe", "ConsistencyInfo", "Uninstall.exe"];

/// Delete BattlEye files if the BattlEye launcher is present.
///
/// Every removal is attempted; failures are logged and skipped. Returns
/// `false` when there was nothing to clean.
pub fn clean_battleye(layout: &InstallLayout) -> bool {
    if !layout.battleye_exe().exists() {
        return false;
    }
    log::info!("BattlEye found in {:?}, cleaning up", layout.root());

    for dir in BATTLEYE_DIRS {
        remove_logged(&layout.root().join(dir), true);
    }
    for file in BATTLEYE_FILES {
        remove_logged(&layout.root().join(file), false);
    }
    true
}

fn remove_logged(path: &Path, is_dir: bool) {
    let result = if is_dir {
        remove_dir_if_exists(path)
    } else {
        remove_file_if_exists(path)
    };
    match result {
        Ok(true) => log::debug!("Removed {:?}", path),
        Ok(false) => {}
        Err(e) => log::warn!("Cleanup failed for {:?}: {:#}", path, e),
    }
}
