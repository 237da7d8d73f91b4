/// Chronicle version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version number carried by the first record of every entity.
pub const FIRST_VERSION: u64 = 1;

/// Default number of attempts made to reserve a version before giving up.
pub const DEFAULT_VERSION_MAX_ATTEMPTS: u32 = 5;

/// Default linear backoff step between version reservation attempts.
pub const DEFAULT_VERSION_RETRY_BACKOFF_MS: u64 = 10;

/// Default number of read connections.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Upper bound on read connections.
pub const MAX_READ_POOL_SIZE: usize = 8;

/// Default SQLite busy timeout.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Attributes that are bookkeeping rather than state and never audited by default.
pub const DEFAULT_IGNORED_ATTRIBUTES: &[&str] = &["created_at", "updated_at", "lock_version"];

/// Attributes consulted, in order, by the name-or-title search predicate.
pub const DISPLAY_ATTRIBUTES: &[&str] = &["name", "title"];
