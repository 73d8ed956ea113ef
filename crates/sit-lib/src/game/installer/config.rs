//! Centralized installer settings.
//! Static constants for endpoints, request policy and the fixed file names of
//! the game tree. Endpoints can be overridden per installer through
//! [`Endpoints`].

use std::time::Duration;

// Request policy for the release catalogs
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const GITHUB_API_VERSION: &str = "2022-11-28";
pub const USER_AGENT: &str = "request";

pub fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

// URL Constants
pub const PATCH_RELEASES_URL: &str =
    "https://sitcoop.publicvm.com/api/v1/repos/SIT/Downgrade-Patches/releases";
pub const SIT_RELEASES_URL: &str =
    "https://api.github.com/repos/stayintarkov/StayInTarkov.Client/releases";
pub const SERVER_RELEASES_URL: &str =
    "https://api.github.com/repos/stayintarkov/SIT.Aki-Server-Mod/releases";
pub const BEPINEX_URL: &str =
    "https://github.com/BepInEx/BepInEx/releases/download/v5.4.22/BepInEx_x64_5.4.22.0.zip";

// Release asset names
pub const MIRRORS_ASSET: &str = "mirrors.json";
pub const SIT_RELEASE_ASSET: &str = "StayInTarkov-Release.zip";
pub const SERVER_RELEASE_ASSET: &str = "Aki-Server-win-with-SITCoop.zip";

// Patcher
pub const PATCHER_ARCHIVE: &str = "Patcher.zip";
pub const PATCHER_DIR_PREFIX: &str = "Patcher";
pub const PATCHER_EXE: &str = "Patcher.exe";
pub const PATCHER_LOG: &str = "Patcher.log";
pub const PATCHER_SCRATCH_DIR: &str = "Aki_Patches";
pub const PATCHER_ARG: &str = "autoclose";

// Game tree
pub const GAME_EXE: &str = "EscapeFromTarkov.exe";
pub const BATTLEYE_EXE: &str = "EscapeFromTarkov_BE.exe";
pub const SIT_PLUGIN: &str = "StayInTarkov.dll";
pub const HOST_ASSEMBLY: &str = "Assembly-CSharp.dll";
pub const BEPINEX_ARCHIVE: &str = "BepInEx5.zip";
pub const SERVER_DIR: &str = "SIT-Server";

// Bundled support libraries written into the managed directory
pub const AKI_COMMON_DLL: &str = "Aki.Common.dll";
pub const AKI_REFLECTION_DLL: &str = "Aki.Reflection.dll";
pub const SUPPORT_LIBRARIES: [&str; 2] = [AKI_COMMON_DLL, AKI_REFLECTION_DLL];

/// Remote locations the installer talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub patch_releases: String,
    pub sit_releases: String,
    pub server_releases: String,
    pub bepinex_package: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            patch_releases: PATCH_RELEASES_URL.to_string(),
            sit_releases: SIT_RELEASES_URL.to_string(),
            server_releases: SERVER_RELEASES_URL.to_string(),
            bepinex_package: BEPINEX_URL.to_string(),
        }
    }
}
