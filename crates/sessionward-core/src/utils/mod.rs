//! Utility functions for time math and display formatting.

pub mod format;
pub mod time;

pub use format::{format_minutes, format_timestamp, mask_token, to_datetime};
pub use time::{minutes_to_millis, now_millis, round_minutes, MS_PER_MINUTE};
