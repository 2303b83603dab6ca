//! Date handling for the feed and export formats.
//!
//! Feed timestamps arrive as strings and publishers are sloppy about the
//! exact ISO-8601 flavor, so decoding tries a cascade of layouts and takes
//! the first that parses. Backup JSON uses chrono's RFC3339 serde encoding
//! throughout and needs no fallback.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// Parse a feed timestamp, keeping the publisher's UTC offset.
///
/// Accepts RFC3339 (with or without fractional seconds), offsets written
/// without a colon, and a space instead of the `T` separator. Returns `None`
/// for anything else, including timestamps with no offset at all.
pub fn parse_feed_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%z"))
        .ok()
}

/// Timezone identifier derived from a parsed feed timestamp.
///
/// Feed records carry only a UTC offset, so the best available identifier is
/// the offset itself: `UTC` for zero, otherwise `UTC+HH:MM` / `UTC-HH:MM`.
pub fn derive_timezone(instant: &DateTime<FixedOffset>) -> String {
    let secs = instant.offset().local_minus_utc();
    if secs == 0 {
        return "UTC".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

/// Timestamp used in export package directory names: `2025-06-01_141530`.
pub fn package_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d_%H%M%S").to_string()
}

/// Fixed ISO-8601 rendering for CSV cells and the README.
pub fn render_datetime(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
