pub mod releases;

pub use releases::{build_catalog_client, build_download_client, fetch_mirrors, fetch_releases};
