use chrono::{DateTime, Duration, Utc};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Convert a retention period in days to an absolute duration.
pub fn max_age_from_days(days: u32) -> Duration {
    Duration::seconds(i64::from(days) * SECONDS_PER_DAY)
}

/// True iff the object's age strictly exceeds `max_age`.
///
/// An object exactly at the threshold is kept. A `modified_at` in the future
/// gives a negative age and is never expired.
pub fn is_expired(
    reference_time: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    reference_time - modified_at > max_age
}
