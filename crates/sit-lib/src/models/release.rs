use serde::{Deserialize, Serialize};

use crate::utils::version::build_number;

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Release entry as served by the GitHub/Gitea release APIs.
///
/// For mod and server releases `body` carries the game version the release
/// targets (e.g. `0.14.1.2.29197`). Patch releases encode their edge in the
/// name as `"<from> to <to>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Look up an asset by exact name. Asset order differs between releases,
    /// so never index into `assets`.
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }

    /// Game version this release requires, taken from the body.
    pub fn target_game_version(&self) -> &str {
        self.body.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Build number of the game version this release requires.
    pub fn target_build(&self) -> &str {
        build_number(self.target_game_version())
    }

    /// Parse a patch release name of the form `"<from> to <to>"`.
    pub fn patch_edge(&self) -> Option<(&str, &str)> {
        let (from, to) = self.name.split_once(" to ")?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some((from, to))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.tag_name.as_deref().unwrap_or_default()
        } else {
            &self.name
        }
    }
}

/// One entry of a patch release's `mirrors.json` manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mirror {
    #[serde(rename = "Link")]
    pub link: String,
}
