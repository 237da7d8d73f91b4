pub mod filter_sql;
pub mod record_ops;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

use chronicle_core::errors::{ChronicleResult, StorageError};

/// Fixed-width UTC text so that lexical order equals time order.
///
/// Truncates to microseconds, the stored precision. Used as is for stored
/// values and for upper bounds: `stored <= t` iff `stored <= trunc(t)`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A lower bound rounded up to the next microsecond, so that
/// `stored >= t` iff `stored >= ceil(t)`.
pub fn format_lower_bound(at: &DateTime<Utc>) -> String {
    let truncated = at.trunc_subsecs(6);
    if truncated < *at {
        format_timestamp(&(truncated + Duration::microseconds(1)))
    } else {
        format_timestamp(at)
    }
}

pub fn parse_timestamp(text: &str) -> ChronicleResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptionDetected {
                details: format!("bad timestamp {text:?}: {e}"),
            }
            .into()
        })
}
