use crate::game::installer::types::ProgressReporter;
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Instant;
use tokio::fs::{create_dir_all, File};
use tokio::io::AsyncWriteExt;

/// Hosts that need a dedicated cloud-storage client instead of plain HTTP
const UNSUPPORTED_HOSTS: [&str; 2] = ["mega.nz", "mega.co.nz"];

/// Whether `link` can be fetched by [`download_to_path`].
///
/// Links on a cloud-storage host (or any of its subdomains) and links that
/// are not http(s) are refused.
pub fn is_downloadable(link: &str) -> bool {
    let Ok(url) = url::Url::parse(link) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    !UNSUPPORTED_HOSTS
        .iter()
        .any(|blocked| host == *blocked || host.ends_with(&format!(".{}", blocked)))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Download a file to a path with progress reporting.
///
/// Any existing file at `path` is replaced. The body is streamed into a
/// `.part` file that is renamed into place once complete.
pub async fn download_to_path(
    client: &Client,
    url: &str,
    path: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let name = file_label(path);

    if !is_downloadable(url) {
        anyhow::bail!(
            "Cannot download '{}': {} needs a cloud storage client",
            name,
            url
        );
    }

    log::info!("Starting download of '{}' from '{}'", name, url);

    if path.exists() {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Remove previous download {:?}", path))?;
    }

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }

    let start = Instant::now();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let total_size = response.content_length();
    log::debug!("Download size: {:?} bytes", total_size);

    let tmp_path = path.with_file_name(format!("{}.part", name));
    let downloaded = match write_body(response, &tmp_path, total_size, reporter).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to remove partial download {:?}: {}", tmp_path, cleanup);
                }
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&tmp_path, path).await?;

    let secs = start.elapsed().as_secs_f64();
    let throughput = (downloaded as f64 / 1024.0 / 1024.0) / secs.max(0.001); // MB/s
    log::info!(
        "Download stats: url={}, size={} bytes, time={:.2}s, throughput={:.2} MB/s",
        url,
        downloaded,
        secs,
        throughput
    );

    Ok(())
}

/// Stream a response body into `tmp_path`, returning the bytes written.
async fn write_body(
    response: reqwest::Response,
    tmp_path: &Path,
    total_size: Option<u64>,
    reporter: &dyn ProgressReporter,
) -> Result<u64> {
    let mut file = File::create(tmp_path)
        .await
        .with_context(|| format!("Create download file {:?}", tmp_path))?;
    let mut downloaded: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;

        downloaded += chunk.len() as u64;
        reporter.update_bytes(downloaded, total_size);
        if let Some(total) = total_size.filter(|t| *t > 0) {
            reporter.set_percent(((downloaded * 100) / total).min(100) as i32);
        }
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(downloaded)
}

/// Download JSON using an existing Client and deserialize
pub async fn download_json_with_client<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T> {
    log::debug!("Downloading JSON (reused client): {}", url);
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let data = response.json().await?;
    Ok(data)
}

/// Extract a zip archive into `dest_dir`, overwriting existing files.
///
/// Reports `(file name, completed, total)` per extracted file. Returns the
/// number of files written.
pub async fn extract_archive(
    archive_path: &Path,
    dest_dir: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    log::debug!("Extracting {:?} to: {:?}", archive_path, dest_dir);

    create_dir_all(dest_dir).await?;

    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Open archive {:?}", archive_path))?;
    let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))
        .with_context(|| format!("Read archive {:?}", archive_path))?;

    let total = (0..archive.len())
        .filter(|i| archive.by_index(*i).map(|entry| !entry.is_dir()).unwrap_or(false))
        .count();
    let mut completed = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };
        let outpath = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(p) = outpath.parent() {
            if !p.exists() {
                std::fs::create_dir_all(p)?;
            }
        }
        let mut outfile = std::fs::File::create(&outpath)
            .with_context(|| format!("Create extracted file {:?}", outpath))?;
        std::io::copy(&mut entry, &mut outfile)?;

        // Set permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }

        completed += 1;
        let entry_name = outpath
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        reporter.set_substep(Some(&entry_name), Some(completed as u32), Some(total as u32));
        reporter.set_percent(((completed * 100) / total.max(1)) as i32);
    }

    log::debug!("Extraction complete: {} files", completed);
    Ok(completed)
}
