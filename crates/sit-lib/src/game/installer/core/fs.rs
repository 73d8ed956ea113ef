//! Small file-system helpers shared by the install pipelines.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy `src` into `dest`, merging with whatever is already there. Existing
/// files are overwritten.
pub fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("Create copy dest {:?}", dest))?;
    for entry in fs::read_dir(src).with_context(|| format!("Read dir {:?}", src))? {
        let entry = entry?;
        let target_path = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target_path)?;
        } else {
            fs::copy(entry.path(), &target_path)
                .with_context(|| format!("Copy file {:?} -> {:?}", entry.path(), target_path))?;
        }
    }
    Ok(())
}

/// Find the first directory in `parent` whose name starts with `prefix`,
/// merge its contents into `parent` and remove it.
///
/// Returns the flattened directory, or `None` when no directory matched.
pub fn flatten_prefixed_dir(parent: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = fs::read_dir(parent)
        .with_context(|| format!("Read dir {:?}", parent))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
        .map(|entry| entry.path())
        .collect();
    matches.sort();

    let Some(dir) = matches.into_iter().next() else {
        return Ok(None);
    };

    log::debug!("Flattening {:?} into {:?}", dir, parent);
    copy_dir_recursive(&dir, parent)?;
    fs::remove_dir_all(&dir).with_context(|| format!("Remove flattened dir {:?}", dir))?;
    Ok(Some(dir))
}

pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Remove file {:?}", path))?;
    Ok(true)
}

pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).with_context(|| format!("Remove dir {:?}", path))?;
    Ok(true)
}
