//! Millisecond timestamps.
//!
//! Every expiry in the session lifecycle is milliseconds since the Unix
//! epoch, matching what gets persisted.

use chrono::Utc;

pub const MS_PER_MINUTE: i64 = 60 * 1000;

/// Current wall-clock time in milliseconds since the epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Saturates at the `i64` bounds instead of overflowing
pub fn minutes_to_millis(minutes: i64) -> i64 {
    minutes.saturating_mul(MS_PER_MINUTE)
}

/// Convert a millisecond span to whole minutes, rounding half away from zero
pub fn round_minutes(millis: i64) -> i64 {
    (millis as f64 / MS_PER_MINUTE as f64).round() as i64
}
