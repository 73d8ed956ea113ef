//! SIT client install: patch the game if needed, then place the plugin, the
//! patched host assembly and the support libraries.

use anyhow::Context;
use std::fs;

use crate::game::installer::cleanup::clean_battleye;
use crate::game::installer::config::{
    HOST_ASSEMBLY, SIT_PLUGIN, SIT_RELEASE_ASSET, SUPPORT_LIBRARIES,
};
use crate::game::installer::core::fs::remove_file_if_exists;
use crate::game::installer::error::InstallError;
use crate::game::installer::layout::InstallLayout;
use crate::game::installer::types::InstallReport;
use crate::game::installer::Installer;
use crate::game::version::{read_version, refresh_mod_version, ArtifactKind};
use crate::models::Release;

impl Installer {
    /// Install the SIT client from `release`.
    ///
    /// The release asset and the bundled support libraries are checked before
    /// anything on disk changes. When the
    /// installed game does not match the release's target version the patch
    /// chain is applied first.
    pub async fn install_mod(&mut self, release: &Release) -> Result<InstallReport, InstallError> {
        log::info!("Starting SIT install: {}", release.display_name());
        let result = self.run_mod_install(release).await;
        self.finish(result, "Installation of SIT was successful.")
    }

    async fn run_mod_install(&mut self, release: &Release) -> Result<InstallReport, InstallError> {
        let layout = self.layout()?;
        let asset = release
            .asset(SIT_RELEASE_ASSET)
            .ok_or_else(|| InstallError::AssetMissing {
                release: release.display_name().to_string(),
                asset: SIT_RELEASE_ASSET.to_string(),
            })?
            .clone();
        self.check_support_libraries()?;

        let patches_applied = self.reconcile_game_version(release).await?;
        let game_version = read_version(ArtifactKind::GameBinary, layout.root());

        self.reporter.start_step("Installing SIT", None);
        clean_battleye(&layout);

        let core_dir = layout.core_files_dir();
        let archive = core_dir.join(SIT_RELEASE_ASSET);
        remove_file_if_exists(&archive)?;
        fs::create_dir_all(&core_dir).with_context(|| format!("Create {:?}", core_dir))?;
        fs::create_dir_all(layout.backup_dir())
            .with_context(|| format!("Create {:?}", layout.backup_dir()))?;

        if !layout.plugins_dir().exists() {
            self.install_bepinex(&layout).await?;
        }

        self.download(&asset.browser_download_url, &archive).await?;
        self.extract(&archive, &core_dir).await?;
        place_release_files(&layout)?;
        self.write_support_libraries(&layout)?;

        let mod_version = refresh_mod_version(&mut self.config);
        self.store.save(&self.config);

        Ok(InstallReport {
            patches_applied,
            game_version,
            mod_version,
            server_path: None,
        })
    }

    async fn install_bepinex(&self, layout: &InstallLayout) -> Result<(), InstallError> {
        log::info!("BepInEx not found, installing it");
        let archive = layout.bepinex_archive();
        self.download(&self.endpoints.bepinex_package, &archive).await?;
        self.extract(&archive, layout.root()).await?;
        fs::create_dir_all(layout.plugins_dir())
            .with_context(|| format!("Create {:?}", layout.plugins_dir()))?;
        Ok(())
    }

    fn check_support_libraries(&self) -> Result<(), InstallError> {
        let missing: Vec<String> = SUPPORT_LIBRARIES
            .iter()
            .filter(|name| !self.support_libraries.iter().any(|l| l.file_name == **name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InstallError::SupportLibrariesMissing { missing })
        }
    }

    fn write_support_libraries(&self, layout: &InstallLayout) -> Result<(), InstallError> {
        let managed = layout.managed_dir();
        fs::create_dir_all(&managed).with_context(|| format!("Create {:?}", managed))?;
        for library in &self.support_libraries {
            let dest = managed.join(&library.file_name);
            fs::write(&dest, &library.bytes).with_context(|| format!("Write {:?}", dest))?;
            log::debug!("Wrote {}", library.file_name);
        }
        Ok(())
    }
}

/// Back up the game's host assembly, then copy the release's host assembly and
/// plugin into place.
fn place_release_files(layout: &InstallLayout) -> anyhow::Result<()> {
    let release_dir = layout.release_dir();
    let managed = layout.managed_dir();
    let host = managed.join(HOST_ASSEMBLY);

    if host.exists() {
        let backup = layout.backup_dir().join(HOST_ASSEMBLY);
        fs::copy(&host, &backup).with_context(|| format!("Back up {:?}", host))?;
    }

    fs::create_dir_all(&managed)?;
    fs::copy(release_dir.join(HOST_ASSEMBLY), &host)
        .with_context(|| format!("Copy {} into {:?}", HOST_ASSEMBLY, managed))?;

    let plugins = layout.plugins_dir();
    fs::create_dir_all(&plugins)?;
    fs::copy(release_dir.join(SIT_PLUGIN), plugins.join(SIT_PLUGIN))
        .with_context(|| format!("Copy {} into {:?}", SIT_PLUGIN, plugins))?;
    Ok(())
}
