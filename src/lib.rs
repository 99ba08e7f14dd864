pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::AppConfig;
pub use core::{SyncEngine, SyncOptions, SyncReport};
pub use error::SyncError;
pub use storage::{ObjectStore, RemoteSource, S3ObjectStore, SftpStorage};
