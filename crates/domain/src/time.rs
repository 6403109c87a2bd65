//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `created_at`, `updated_at`, review times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whole days elapsed between `since` and `now`, rounded down.
///
/// Negative when `since` lies in the future.
#[must_use]
pub fn days_between(since: Timestamp, now: Timestamp) -> i64 {
    (now - since).num_days()
}
