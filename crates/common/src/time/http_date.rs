//! RFC 1123 HTTP-date formatting
//!
//! Downstream gateways (and their test doubles) match the `Date` header by
//! pattern, so the format is fixed: English day and month abbreviations, a
//! zero-padded day, UTC, and a literal `GMT` suffix.

use chrono::{DateTime, NaiveDateTime, Utc};

/// `strftime` pattern for an IMF-fixdate, e.g. `Wed, 23 Oct 2024 07:28:00 GMT`.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const HTTP_DATE_LEN: usize = 29;

/// Format an instant as an HTTP date.
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format(HTTP_DATE_FORMAT).to_string()
}

/// Whether `value` is a well-formed HTTP date whose weekday matches its date.
pub fn is_http_date(value: &str) -> bool {
    value.len() == HTTP_DATE_LEN && NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT).is_ok()
}
