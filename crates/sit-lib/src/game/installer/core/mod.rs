pub mod downloader;
pub mod fs;
pub mod traits;
