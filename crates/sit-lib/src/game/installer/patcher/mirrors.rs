use url::Url;

use crate::game::installer::core::downloader::is_downloadable;
use crate::models::Mirror;

/// A download link tagged with the hosting provider it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCandidate {
    pub provider: String,
    pub url: String,
    /// False when the link needs a client the downloader does not have
    pub downloadable: bool,
}

/// One link per provider, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorCandidates {
    entries: Vec<MirrorCandidate>,
}

impl MirrorCandidates {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn first(&self) -> Option<&MirrorCandidate> {
        self.entries.first()
    }

    /// Candidates the downloader can fetch, in order.
    pub fn downloadable(&self) -> impl Iterator<Item = &MirrorCandidate> {
        self.entries.iter().filter(|c| c.downloadable)
    }

    pub fn first_downloadable(&self) -> Option<&MirrorCandidate> {
        self.downloadable().next()
    }

    pub fn get(&self, provider: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.provider == provider)
            .map(|c| c.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MirrorCandidate> {
        self.entries.iter()
    }

    fn insert(&mut self, provider: String, url: String) {
        if self.get(&provider).is_none() {
            let downloadable = is_downloadable(&url);
            self.entries.push(MirrorCandidate {
                provider,
                url,
                downloadable,
            });
        }
    }
}

/// Provider name of a link: the host without `www.`, cut at the first dot.
///
/// `https://www.mega.nz/file/x` → `mega`, `https://drive.google.com/x` → `drive`.
pub fn provider_key(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

/// Group mirrors by provider, keeping the first link of each.
pub fn mirror_candidates(mirrors: &[Mirror]) -> MirrorCandidates {
    let mut candidates = MirrorCandidates::default();
    for mirror in mirrors {
        match provider_key(&mirror.link) {
            Some(provider) => candidates.insert(provider, mirror.link.clone()),
            None => log::warn!("Skipping unparseable mirror link '{}'", mirror.link),
        }
    }
    candidates
}
