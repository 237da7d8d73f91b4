//! Configuration for every Chronicle subsystem.

pub mod chronicle_config;
pub mod diff_config;
pub mod logging_config;
pub mod storage_config;
pub mod versioning_config;

pub use chronicle_config::ChronicleConfig;
pub use diff_config::DiffConfig;
pub use logging_config::LoggingConfig;
pub use storage_config::StorageConfig;
pub use versioning_config::VersioningConfig;
