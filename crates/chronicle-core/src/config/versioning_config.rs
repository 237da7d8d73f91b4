use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_VERSION_MAX_ATTEMPTS, DEFAULT_VERSION_RETRY_BACKOFF_MS};

/// Bounds on automatic retry of version reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Attempts before surfacing `VersioningConflict`. Default: 5.
    pub max_attempts: u32,
    /// Backoff step; attempt `n` waits `n * retry_backoff_ms`. Default: 10.
    pub retry_backoff_ms: u64,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_VERSION_MAX_ATTEMPTS,
            retry_backoff_ms: DEFAULT_VERSION_RETRY_BACKOFF_MS,
        }
    }
}
