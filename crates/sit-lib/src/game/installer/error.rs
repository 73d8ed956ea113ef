use thiserror::Error;

use crate::game::installer::patcher::PatcherOutcome;

/// Why an install or patch pipeline stopped.
///
/// Every variant is terminal for the current operation; nothing is retried.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Install path is not set. Configure it in the settings.")]
    ConfigError,

    #[error("The release catalog returned no releases")]
    CatalogEmpty,

    #[error("No patch chain leads from game build {installed} to build {target}")]
    ChainUnresolvable { installed: String, target: String },

    #[error("Mirror selection was cancelled or no mirror was selected")]
    MirrorSelectionCancelled,

    #[error("No download mirrors found for {release}")]
    NoMirrors { release: String },

    #[error("Release {release} has no asset named {asset}")]
    AssetMissing { release: String, asset: String },

    #[error("Bundled support libraries are missing: {}", .missing.join(", "))]
    SupportLibrariesMissing { missing: Vec<String> },

    #[error("Failed to download {name}: {reason}")]
    DownloadFailed { name: String, reason: String },

    #[error("Failed to extract {archive}: {reason}")]
    ExtractFailed { archive: String, reason: String },

    #[error("{0}")]
    PatcherNonSuccess(PatcherOutcome),

    #[error("Patch step {step} failed: {source}")]
    PatchFailed {
        step: String,
        #[source]
        source: Box<InstallError>,
    },

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl InstallError {
    /// True when the user backed out of the operation; callers keep these
    /// quiet instead of showing an error.
    pub fn is_cancellation(&self) -> bool {
        match self {
            InstallError::MirrorSelectionCancelled => true,
            InstallError::PatchFailed { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }

    /// True for faults worth pointing the user at the log for.
    pub fn wants_log(&self) -> bool {
        match self {
            InstallError::DownloadFailed { .. }
            | InstallError::ExtractFailed { .. }
            | InstallError::Unhandled(_) => true,
            InstallError::PatchFailed { source, .. } => source.wants_log(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_seen_through_patch_failures() {
        let err = InstallError::PatchFailed {
            step: "29197 to 28476".to_string(),
            source: Box::new(InstallError::MirrorSelectionCancelled),
        };
        assert!(err.is_cancellation());
        assert!(!err.wants_log());
        assert!(!InstallError::ConfigError.is_cancellation());
    }

    #[test]
    fn patcher_outcome_message_is_shown_verbatim() {
        let err = InstallError::PatcherNonSuccess(PatcherOutcome::MissingPatchData);
        assert_eq!(err.to_string(), "'Aki_Patches' is missing.");
    }

    #[test]
    fn unexpected_faults_keep_their_message() {
        let err: InstallError = anyhow::anyhow!("disk full").into();
        assert!(err.wants_log());
        assert_eq!(err.to_string(), "disk full");
    }
}
