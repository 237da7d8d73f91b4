//! Error handling for Chronicle.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod chronicle_error;
pub mod config_error;
pub mod storage_error;

pub use chronicle_error::{ChronicleError, ChronicleResult};
pub use config_error::ConfigError;
pub use storage_error::StorageError;
