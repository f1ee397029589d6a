use chrono::Utc;

/// Milliseconds since the Unix epoch. Stored in `modelMetadata` to order configured models.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the current timestamp in RFC 3339 format, used in human-facing reports.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339()
}
