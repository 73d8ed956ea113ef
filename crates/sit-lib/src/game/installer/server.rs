use anyhow::Context;

use crate::game::installer::config::SERVER_RELEASE_ASSET;
use crate::game::installer::core::fs::remove_file_if_exists;
use crate::game::installer::error::InstallError;
use crate::game::installer::types::InstallReport;
use crate::game::installer::Installer;
use crate::game::version::{read_version, refresh_mod_version, ArtifactKind};
use crate::models::Release;

impl Installer {
    /// Install the SIT-enabled SPT-AKI server next to the game directory and
    /// remember where it went.
    pub async fn install_server(
        &mut self,
        release: &Release,
    ) -> Result<InstallReport, InstallError> {
        log::info!("Starting server install: {}", release.display_name());
        let result = self.run_server_install(release).await;
        self.finish(result, "Installation of Server was successful.")
    }

    async fn run_server_install(
        &mut self,
        release: &Release,
    ) -> Result<InstallReport, InstallError> {
        let layout = self.layout()?;
        let asset = release
            .asset(SERVER_RELEASE_ASSET)
            .ok_or_else(|| InstallError::AssetMissing {
                release: release.display_name().to_string(),
                asset: SERVER_RELEASE_ASSET.to_string(),
            })?
            .clone();

        let patches_applied = self.reconcile_game_version(release).await?;
        let game_version = read_version(ArtifactKind::GameBinary, layout.root());

        self.reporter.start_step("Installing server", None);
        let server_dir = layout.server_dir();
        std::fs::create_dir_all(&server_dir)
            .with_context(|| format!("Create server dir {:?}", server_dir))?;

        let archive = server_dir.join(SERVER_RELEASE_ASSET);
        self.download(&asset.browser_download_url, &archive).await?;
        self.extract(&archive, &server_dir).await?;
        remove_file_if_exists(&archive)?;

        let mod_version = refresh_mod_version(&mut self.config);
        self.config.aki_server_path = Some(server_dir.clone());
        log::info!("Server installation path automatically set to {:?}", server_dir);
        self.store.save(&self.config);

        Ok(InstallReport {
            patches_applied,
            game_version,
            mod_version,
            server_path: Some(server_dir),
        })
    }
}
