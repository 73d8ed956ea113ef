//! Installed version detection for the game executable and the SIT plugin.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::game::installer::config::{GAME_EXE, SIT_PLUGIN};
use crate::models::ManagerConfig;
use crate::utils::version::{build_number, read_product_version};

static GAME_VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,2}\.\d{1,2}\.\d{1,2}\.\d{1,2}-\d{1,5}").expect("valid game version pattern")
});

static PLUGIN_VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"1+\.\d{1,2}\.\d{1,5}\.\d{1,5}").expect("valid plugin version pattern")
});

/// Which installed binary a version was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    GameBinary,
    ModPlugin,
}

impl ArtifactKind {
    /// Location of the binary relative to the install path
    pub fn relative_path(&self) -> PathBuf {
        match self {
            ArtifactKind::GameBinary => PathBuf::from(GAME_EXE),
            ArtifactKind::ModPlugin => Path::new("BepInEx").join("plugins").join(SIT_PLUGIN),
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            ArtifactKind::GameBinary => &*GAME_VERSION_PATTERN,
            ArtifactKind::ModPlugin => &*PLUGIN_VERSION_PATTERN,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::GameBinary => "EFT",
            ArtifactKind::ModPlugin => "SIT",
        }
    }
}

/// A version read out of an installed binary.
///
/// `raw` is empty when the product version did not match the expected
/// pattern; comparisons against it then never succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub kind: ArtifactKind,
    pub raw: String,
    pub build_number: String,
}

impl InstalledVersion {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Extract the kind-specific version from a product version string.
pub fn parse_version(kind: ArtifactKind, product_version: &str) -> InstalledVersion {
    let raw = kind
        .pattern()
        .find(product_version)
        .map(|m| m.as_str().replace('-', "."))
        .unwrap_or_default();
    let build_number = build_number(&raw).to_string();
    InstalledVersion {
        kind,
        raw,
        build_number,
    }
}

/// Read the installed version of `kind` under `install_path`.
///
/// Returns `None` when the binary does not exist.
pub fn read_version(kind: ArtifactKind, install_path: &Path) -> Option<InstalledVersion> {
    let path = install_path.join(kind.relative_path());
    if !path.exists() {
        log::info!("{} version check: file did not exist at {:?}", kind.label(), path);
        return None;
    }

    let product_version = match read_product_version(&path) {
        Ok(Some(version)) => version,
        Ok(None) => {
            log::warn!("No product version found in {:?}", path);
            String::new()
        }
        Err(e) => {
            log::warn!("Failed to read version metadata of {:?}: {:#}", path, e);
            String::new()
        }
    };

    let version = parse_version(kind, &product_version);
    if version.is_empty() {
        log::warn!(
            "{} product version '{}' did not match the expected pattern",
            kind.label(),
            product_version
        );
    }
    Some(version)
}

/// Re-read the game version and store it in `config`.
/// Leaves `config` untouched when the executable is missing.
pub fn refresh_game_version(config: &mut ManagerConfig) -> Option<InstalledVersion> {
    let version = read_version(ArtifactKind::GameBinary, config.install_path()?)?;
    log::info!("EFT version is now: {}", version);
    config.tarkov_version = Some(version.raw.clone());
    Some(version)
}

/// Re-read the SIT plugin version and store it in `config`.
/// Leaves `config` untouched when the plugin is missing.
pub fn refresh_mod_version(config: &mut ManagerConfig) -> Option<InstalledVersion> {
    let version = read_version(ArtifactKind::ModPlugin, config.install_path()?)?;
    log::info!("SIT version is now: {}", version);
    config.sit_version = Some(version.raw.clone());
    Some(version)
}
