//! Install and update engine for Stay In Tarkov.
//!
//! The crate reconciles the installed game build with the build a mod release
//! targets, applies the downgrade patcher chain when needed and lays the
//! release files into the game tree.

pub mod api;
pub mod game;
pub mod models;
pub mod utils;

pub use game::installer::error::InstallError;
pub use game::installer::{InstallReport, Installer};
pub use models::{ConfigStore, ManagerConfig, Mirror, Release, ReleaseAsset};
