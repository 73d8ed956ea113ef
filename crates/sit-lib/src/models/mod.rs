pub mod config;
pub mod release;

pub use config::{ConfigStore, ManagerConfig, NoopConfigStore};
pub use release::{Mirror, Release, ReleaseAsset};
