use chrono::DateTime;

/// Render a unix timestamp as a UTC date string.
pub fn format_timestamp(secs: u64) -> String {
    match DateTime::from_timestamp(secs as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown".to_string(),
    }
}
