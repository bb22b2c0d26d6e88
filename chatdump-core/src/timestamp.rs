use chrono::{DateTime, Utc};

const DISPLAY_FORMAT: &str = "%b %-d, %Y at %-I:%M %p";

/// Parses an export timestamp. RFC 3339 covers both the fractional-second
/// and whole-second forms the export uses.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Human-readable form of an export timestamp; unparseable input is
/// returned as-is.
pub fn display_timestamp(raw: &str) -> String {
    match parse_iso8601(raw) {
        Some(parsed) => parsed.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}
