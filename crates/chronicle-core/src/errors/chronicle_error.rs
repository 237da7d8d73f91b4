use super::{ConfigError, StorageError};

/// Crate-wide result alias.
pub type ChronicleResult<T> = Result<T, ChronicleError>;

/// Top-level error type. Subsystem errors convert into it via `From`.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// Version reservation kept colliding with concurrent writers.
    /// Transient: the caller may retry the whole write.
    #[error("versioning conflict on {entity} after {attempts} attempts")]
    VersioningConflict { entity: String, attempts: u32 },

    #[error("entity type cannot be resolved: {entity_type}")]
    EntityTypeUnresolvable { entity_type: String },

    /// Stored changes could not be decoded. Indicates data corruption.
    #[error("malformed diff in record {record_id}: {reason}")]
    MalformedDiff { record_id: String, reason: String },

    #[error("invalid mutation: {reason}")]
    InvalidMutation { reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl ChronicleError {
    /// Whether retrying the failed operation may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::VersioningConflict { .. })
    }
}

impl From<serde_json::Error> for ChronicleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
