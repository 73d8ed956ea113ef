//! Release catalog client
//!
//! Fetches release indexes (SIT client, SIT server, downgrade patches) and the
//! mirror manifests attached to patch releases.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::game::installer::config::{request_timeout, GITHUB_API_VERSION, USER_AGENT};
use crate::game::installer::core::downloader::download_json_with_client;
use crate::models::{Mirror, Release};

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static(GITHUB_API_VERSION),
    );
    headers
}

/// Client for catalog requests: a hard 15 second budget per request.
pub fn build_catalog_client() -> Result<Client> {
    Client::builder()
        .timeout(request_timeout())
        .user_agent(USER_AGENT)
        .default_headers(default_headers())
        .build()
        .context("Failed to create HTTP client")
}

/// Client for package downloads. Only connecting is bounded; large archives
/// may stream for as long as they need.
pub fn build_download_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(request_timeout())
        .user_agent(USER_AGENT)
        .default_headers(default_headers())
        .build()
        .context("Failed to create HTTP client")
}

/// Fetch a release index.
///
/// An unreachable index, an error status or a body that is not a release list
/// all yield an empty list: there is simply nothing to offer. No retry.
pub async fn fetch_releases(client: &Client, index_url: &str) -> Vec<Release> {
    log::debug!("Fetching releases from {}", index_url);

    match download_json_with_client::<Vec<Release>>(client, index_url).await {
        Ok(releases) => {
            if releases.is_empty() {
                log::info!("Release index {} is empty", index_url);
            } else {
                log::info!("Fetched {} releases from {}", releases.len(), index_url);
            }
            releases
        }
        Err(e) => {
            log::warn!("Failed to fetch releases from {}: {:#}", index_url, e);
            Vec::new()
        }
    }
}

/// Fetch a patch release's `mirrors.json` manifest.
pub async fn fetch_mirrors(client: &Client, manifest_url: &str) -> Result<Vec<Mirror>> {
    log::debug!("Fetching mirrors from {}", manifest_url);
    download_json_with_client(client, manifest_url)
        .await
        .with_context(|| format!("Failed to fetch mirror manifest {}", manifest_url))
}
