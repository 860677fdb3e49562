//! Server-time parsing for the IRCv3 server-time capability.

use chrono::{DateTime, Utc};

/// Parse an IRCv3 server-time tag value.
///
/// Accepts RFC 3339 formatted timestamps like `2023-01-01T12:00:00.000Z`.
/// Returns `None` if parsing fails.
pub fn parse_server_time(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a timestamp as an IRCv3 server-time string.
///
/// Returns an ISO 8601 timestamp like `2023-01-01T12:00:00.000Z`.
pub fn format_server_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
