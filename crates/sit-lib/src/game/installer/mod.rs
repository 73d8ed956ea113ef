pub mod cleanup;
pub mod config;
pub mod core;
pub mod error;
pub mod layout;
pub mod patcher;
pub mod server;
pub mod sit;
pub mod types;

#[cfg(test)]
mod tests;

use reqwest::Client;
use std::path::Path;
use std::sync::Arc;

use crate::api::releases::{build_catalog_client, build_download_client, fetch_mirrors, fetch_releases};
use crate::game::version::refresh_game_version;
use crate::models::{ConfigStore, ManagerConfig, Release};
use crate::utils::version::build_number;
use crate::game::installer::config::{Endpoints, MIRRORS_ASSET, PATCHER_DIR_PREFIX};
use crate::game::installer::core::downloader::{download_to_path, extract_archive};
use crate::game::installer::core::fs::{flatten_prefixed_dir, remove_file_if_exists};
use crate::game::installer::core::traits::{MirrorSelector, PatcherLauncher, ProcessLauncher};
use crate::game::installer::error::InstallError;
use crate::game::installer::layout::InstallLayout;
use crate::game::installer::patcher::{
    mirror_candidates, resolve_chain, run_patcher, ChainResolution, PatchStep,
};

pub use types::{InstallReport, ProgressReporter, SilentProgressReporter, SupportLibrary};

/// Drives mod and server installs for one game installation.
///
/// Owns the manager config for the duration of an install; every change
/// worth keeping is handed to the [`ConfigStore`].
pub struct Installer {
    config: ManagerConfig,
    endpoints: Endpoints,
    catalog_client: Client,
    download_client: Client,
    store: Arc<dyn ConfigStore>,
    mirrors: Arc<dyn MirrorSelector>,
    patcher: Arc<dyn PatcherLauncher>,
    reporter: Arc<dyn ProgressReporter>,
    support_libraries: Vec<SupportLibrary>,
}

impl Installer {
    pub fn new(
        config: ManagerConfig,
        store: Arc<dyn ConfigStore>,
        mirrors: Arc<dyn MirrorSelector>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            endpoints: Endpoints::default(),
            catalog_client: build_catalog_client()?,
            download_client: build_download_client()?,
            store,
            mirrors,
            patcher: Arc::new(ProcessLauncher),
            reporter,
            support_libraries: Vec::new(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_patcher(mut self, patcher: Arc<dyn PatcherLauncher>) -> Self {
        self.patcher = patcher;
        self
    }

    pub fn with_support_libraries(mut self, libraries: Vec<SupportLibrary>) -> Self {
        self.support_libraries = libraries;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn into_config(self) -> ManagerConfig {
        self.config
    }

    pub async fn fetch_mod_releases(&self) -> Vec<Release> {
        fetch_releases(&self.catalog_client, &self.endpoints.sit_releases).await
    }

    pub async fn fetch_server_releases(&self) -> Vec<Release> {
        fetch_releases(&self.catalog_client, &self.endpoints.server_releases).await
    }

    pub async fn fetch_patch_releases(&self) -> Vec<Release> {
        fetch_releases(&self.catalog_client, &self.endpoints.patch_releases).await
    }

    fn layout(&self) -> Result<InstallLayout, InstallError> {
        self.config
            .install_path()
            .map(InstallLayout::new)
            .ok_or(InstallError::ConfigError)
    }

    /// Bring the game to the build `release` targets, applying downgrade
    /// patches when the installed version differs.
    ///
    /// Returns the applied steps. The game version is read from disk before
    /// the check and again once the patch stage has run, whether or not it
    /// succeeded; the re-read version is saved straight away so a later
    /// failure cannot make the next run patch the same game twice.
    pub async fn reconcile_game_version(
        &mut self,
        release: &Release,
    ) -> Result<Vec<PatchStep>, InstallError> {
        let layout = self.layout()?;
        refresh_game_version(&mut self.config);

        let target_version = release.target_game_version();
        if self.config.tarkov_version.as_deref() == Some(target_version) {
            log::info!("EFT is already at {}, no patching needed", target_version);
            return Ok(Vec::new());
        }

        let result = self.patch_to(release, layout.root()).await;
        refresh_game_version(&mut self.config);
        self.store.save(&self.config);
        result
    }

    async fn patch_to(
        &self,
        release: &Release,
        root: &Path,
    ) -> Result<Vec<PatchStep>, InstallError> {
        let installed = self
            .config
            .tarkov_version
            .as_deref()
            .map(build_number)
            .unwrap_or_default()
            .to_string();
        let target = release.target_build().to_string();

        if !installed.is_empty() && installed == target {
            return Ok(Vec::new());
        }

        let catalog = self.fetch_patch_releases().await;
        let steps = match resolve_chain(&installed, &target, &catalog) {
            ChainResolution::NoPatchNeeded => return Ok(Vec::new()),
            ChainResolution::Chain(steps) => steps,
            ChainResolution::Unresolvable => {
                let mod_build = self.config.sit_version.as_deref().map(build_number);
                if mod_build == Some(target.as_str()) {
                    log::info!(
                        "No patch chain from {} to {}, but SIT is already built for {}",
                        installed,
                        target,
                        target
                    );
                    return Ok(Vec::new());
                }
                if catalog.is_empty() {
                    return Err(InstallError::CatalogEmpty);
                }
                return Err(InstallError::ChainUnresolvable { installed, target });
            }
        };

        let total = steps.len() as u32;
        self.reporter.start_step("Patching game", Some(total));
        for (index, step) in steps.iter().enumerate() {
            log::info!("Applying patch {} ({}/{})", step.label(), index + 1, total);
            self.reporter.set_step_count(index as u32 + 1, Some(total));
            self.apply_patch_step(step, root)
                .await
                .map_err(|source| InstallError::PatchFailed {
                    step: step.label(),
                    source: Box::new(source),
                })?;
        }
        log::info!("Patcher completed successfully.");
        Ok(steps)
    }

    /// Download, unpack and run the patcher of one patch release.
    pub async fn apply_patch_step(&self, step: &PatchStep, root: &Path) -> Result<(), InstallError> {
        let layout = InstallLayout::new(root);
        let release = &step.release;
        let manifest = release
            .asset(MIRRORS_ASSET)
            .ok_or_else(|| InstallError::AssetMissing {
                release: release.display_name().to_string(),
                asset: MIRRORS_ASSET.to_string(),
            })?;

        let mirrors = fetch_mirrors(&self.catalog_client, &manifest.browser_download_url)
            .await
            .map_err(|e| InstallError::DownloadFailed {
                name: MIRRORS_ASSET.to_string(),
                reason: format!("{:#}", e),
            })?;
        let candidates = mirror_candidates(&mirrors);
        if candidates.first_downloadable().is_none() {
            return Err(InstallError::NoMirrors {
                release: release.display_name().to_string(),
            });
        }

        let url = self
            .mirrors
            .select(release, &candidates)
            .await
            .filter(|url| !url.is_empty())
            .ok_or(InstallError::MirrorSelectionCancelled)?;

        let archive = layout.patcher_archive();
        self.download(&url, &archive).await?;
        self.extract(&archive, root).await?;
        flatten_prefixed_dir(root, PATCHER_DIR_PREFIX)?;
        remove_file_if_exists(&archive)?;

        let outcome = run_patcher(self.patcher.as_ref(), root).await?;
        if !outcome.is_success() {
            log::error!("Patcher failed: {}", outcome);
            return Err(InstallError::PatcherNonSuccess(outcome));
        }
        Ok(())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), InstallError> {
        let name = file_name(dest);
        self.reporter.set_message(&format!("Downloading '{}'", name));
        download_to_path(&self.download_client, url, dest, self.reporter.as_ref())
            .await
            .map_err(|e| {
                log::error!("Download of '{}' failed: {:#}", name, e);
                InstallError::DownloadFailed {
                    name,
                    reason: format!("{:#}", e),
                }
            })
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, InstallError> {
        let name = file_name(archive);
        self.reporter.set_message(&format!("Extracting '{}'", name));
        extract_archive(archive, dest, self.reporter.as_ref())
            .await
            .map_err(|e| {
                log::error!("Extraction of '{}' failed: {:#}", name, e);
                InstallError::ExtractFailed {
                    archive: name,
                    reason: format!("{:#}", e),
                }
            })
    }

    /// Report the end of a pipeline to the progress reporter and pass the
    /// result through.
    fn finish<T>(&self, result: Result<T, InstallError>, success: &str) -> Result<T, InstallError> {
        match &result {
            Ok(_) => self.reporter.done(true, Some(success)),
            Err(e) if e.is_cancellation() => {
                log::info!("Install cancelled: {}", e);
                self.reporter.done(false, None);
            }
            Err(e) => {
                log::error!("Install failed: {}", e);
                self.reporter.done(false, Some(&e.to_string()));
            }
        }
        result
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
