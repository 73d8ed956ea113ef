pub mod installer;
pub mod version;

// Re-export commonly used types
pub use installer::patcher::{resolve_chain, ChainResolution, PatchStep, PatcherOutcome};
pub use version::{read_version, ArtifactKind, InstalledVersion};
