//! RFC 822 date normalization for RSS `pubDate`/`lastBuildDate`.
//!
//! RSS feeds carry dates such as `Wed, 02 Oct 2002 15:00:00 EST`. The zone
//! token may be numeric (`+0200`) or one of the legacy symbolic names RFC 822
//! allows: universal time, the North American zones, and the single-letter
//! military zones. Symbolic zones are rewritten to their numeric offset before
//! the whole string is parsed against a fixed layout.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Layout every normalized date is parsed with.
const LAYOUT: &str = "%a, %d %b %Y %H:%M:%S %z";
/// RFC 822 makes the weekday optional; some feeds drop it.
const LAYOUT_NO_WEEKDAY: &str = "%d %b %Y %H:%M:%S %z";

/// Symbolic zones and their fixed offsets. `J` (military local time) has no
/// fixed offset and is not listed.
const ZONE_OFFSETS: &[(&str, &str)] = &[
    ("GMT", "+0000"),
    ("UTC", "+0000"),
    ("UT", "+0000"),
    ("EDT", "-0400"),
    ("EST", "-0500"),
    ("CDT", "-0500"),
    ("CST", "-0600"),
    ("MDT", "-0600"),
    ("MST", "-0700"),
    ("PDT", "-0700"),
    ("PST", "-0800"),
    ("A", "+0100"),
    ("B", "+0200"),
    ("C", "+0300"),
    ("D", "+0400"),
    ("E", "+0500"),
    ("F", "+0600"),
    ("G", "+0700"),
    ("H", "+0800"),
    ("I", "+0900"),
    ("K", "+1000"),
    ("L", "+1100"),
    ("M", "+1200"),
    ("N", "-0100"),
    ("O", "-0200"),
    ("P", "-0300"),
    ("Q", "-0400"),
    ("R", "-0500"),
    ("S", "-0600"),
    ("T", "-0700"),
    ("U", "-0800"),
    ("V", "-0900"),
    ("W", "-1000"),
    ("X", "-1100"),
    ("Y", "-1200"),
    ("Z", "+0000"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    /// The string does not match the RFC 822 layout.
    #[error("malformed date-time: {0:?}")]
    Malformed(String),

    /// The zone token is neither numeric nor a known symbolic zone.
    #[error("unknown time zone {0:?}")]
    UnknownZone(String),
}

/// Numeric offset for a symbolic zone name, if the name is known.
pub fn zone_offset(token: &str) -> Option<&'static str> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, offset)| *offset)
}

/// Parses an RFC 822 date into an absolute instant with seconds resolution.
///
/// # Examples
///
/// ```
/// use sift::feed::parse_rfc822;
///
/// let est = parse_rfc822("Wed, 02 Oct 2002 15:00:00 EST").unwrap();
/// let utc = parse_rfc822("Wed, 02 Oct 2002 20:00:00 +0000").unwrap();
/// assert_eq!(est, utc);
///
/// assert!(parse_rfc822("Wed, 02 Oct 2002 15:00:00 ZZZ").is_err());
/// ```
pub fn parse_rfc822(input: &str) -> Result<DateTime<Utc>, DateTimeError> {
    let input = input.trim();
    let (head, zone) = input
        .rsplit_once(' ')
        .ok_or_else(|| DateTimeError::Malformed(input.to_string()))?;

    let offset = if zone.starts_with('+') || zone.starts_with('-') {
        zone
    } else {
        zone_offset(zone).ok_or_else(|| DateTimeError::UnknownZone(zone.to_string()))?
    };

    let normalized = format!("{head} {offset}");
    let layout = if head.contains(',') {
        LAYOUT
    } else {
        LAYOUT_NO_WEEKDAY
    };

    DateTime::parse_from_str(&normalized, layout)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DateTimeError::Malformed(input.to_string()))
}

/// Parses an RFC 3339 timestamp as used by Atom `updated`/`published`.
pub fn parse_rfc3339(input: &str) -> Result<DateTime<Utc>, DateTimeError> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DateTimeError::Malformed(input.to_string()))
}
