use crate::game::installer::patcher::MirrorCandidates;
use crate::models::Release;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::path::Path;

/// Picks the download mirror for a patch release.
/// Front ends implement this to ask the user; `None` cancels the install.
pub trait MirrorSelector: Send + Sync {
    fn select<'a>(
        &'a self,
        release: &'a Release,
        candidates: &'a MirrorCandidates,
    ) -> BoxFuture<'a, Option<String>>;
}

/// Takes the first provider the downloader can fetch without asking.
pub struct FirstMirrorSelector;

impl MirrorSelector for FirstMirrorSelector {
    fn select<'a>(
        &'a self,
        _release: &'a Release,
        candidates: &'a MirrorCandidates,
    ) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { candidates.first_downloadable().map(|c| c.url.clone()) })
    }
}

/// Starts the external patcher and waits for it to exit.
///
/// Resolves to the exit code, or `None` when the process was terminated
/// without one.
pub trait PatcherLauncher: Send + Sync {
    fn launch<'a>(
        &'a self,
        exe: &'a Path,
        working_dir: &'a Path,
        args: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Option<i32>>>;
}

/// Runs the patcher as a child process.
pub struct ProcessLauncher;

impl PatcherLauncher for ProcessLauncher {
    fn launch<'a>(
        &'a self,
        exe: &'a Path,
        working_dir: &'a Path,
        args: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Option<i32>>> {
        Box::pin(async move {
            log::info!("Launching {:?} {:?} in {:?}", exe, args, working_dir);
            let status = tokio::process::Command::new(exe)
                .args(args)
                .current_dir(working_dir)
                .status()
                .await
                .with_context(|| format!("Failed to start {:?}", exe))?;
            Ok(status.code())
        })
    }
}
