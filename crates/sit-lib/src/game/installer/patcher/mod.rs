//! Downgrade patching: which patches to apply, where to get them and how to
//! run them.

pub mod chain;
pub mod mirrors;
pub mod runner;

pub use chain::{resolve_chain, ChainResolution, PatchStep};
pub use mirrors::{mirror_candidates, provider_key, MirrorCandidate, MirrorCandidates};
pub use runner::{run_patcher, PatcherOutcome};
