use chrono::{DateTime, Local, TimeZone};

/// Format an epoch-millisecond timestamp in local time for display
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%b %d, %Y %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

/// Convert an epoch-millisecond timestamp to a UTC datetime
pub fn to_datetime(millis: i64) -> Option<DateTime<chrono::Utc>> {
    chrono::Utc.timestamp_millis_opt(millis).single()
}

/// Shorten an opaque token so it can be shown without leaking it whole
pub fn mask_token(token: &str) -> String {
    const VISIBLE: usize = 12;
    if token.chars().count() <= VISIBLE {
        token.to_string()
    } else {
        let head: String = token.chars().take(VISIBLE).collect();
        format!("{}...", head)
    }
}

/// Render a minute count like "6 min", "1 h 5 min"
pub fn format_minutes(minutes: i64) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else if minutes % 60 == 0 {
        format!("{} h", minutes / 60)
    } else {
        format!("{} h {} min", minutes / 60, minutes % 60)
    }
}
