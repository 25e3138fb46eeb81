//! Display formatting for values coming back from the remote API.
//!
//! The remote sends timestamps as ISO-8601 strings in a few shapes (`Z`
//! suffix or numeric offset or none, `T` or space separator, optional
//! fractional seconds). Pages show them as `DD/MM/YYYY HH:MM` using the wall
//! clock fields as written; no timezone conversion happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Output pattern for timestamps shown to users.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Result of formatting a remote timestamp.
///
/// A value the parser does not understand is kept verbatim in
/// [`DisplayDate::Unparsed`] so callers can tell the two cases apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayDate {
    /// Successfully reformatted as `DD/MM/YYYY HH:MM`.
    Formatted(String),
    /// The original input, unchanged.
    Unparsed(String),
}

impl DisplayDate {
    /// The text to show, whichever way formatting went.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Formatted(s) | Self::Unparsed(s) => s,
        }
    }

    #[must_use]
    pub const fn is_formatted(&self) -> bool {
        matches!(self, Self::Formatted(_))
    }
}

/// Reformat an ISO-8601 timestamp for display.
///
/// ```
/// use sakila_web::display::{DisplayDate, format_datetime};
///
/// assert_eq!(
///     format_datetime("2024-01-15T10:30:00Z"),
///     DisplayDate::Formatted("15/01/2024 10:30".to_string())
/// );
/// assert_eq!(
///     format_datetime("not a date"),
///     DisplayDate::Unparsed("not a date".to_string())
/// );
/// ```
#[must_use]
pub fn format_datetime(raw: &str) -> DisplayDate {
    let trimmed = raw.trim();

    // `Z` is the same instant as `+00:00`; normalise both separators to `T`.
    let normalized = trimmed
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| trimmed.to_string(), |s| format!("{s}+00:00"))
        .replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return DisplayDate::Formatted(dt.format(DISPLAY_FORMAT).to_string());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, pattern) {
            return DisplayDate::Formatted(dt.format(DISPLAY_FORMAT).to_string());
        }
    }

    if let Some(dt) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return DisplayDate::Formatted(dt.format(DISPLAY_FORMAT).to_string());
    }

    DisplayDate::Unparsed(raw.to_string())
}

/// Format a timestamp for a template, falling back to the raw value.
///
/// The fallback is logged so malformed remote data does not go unnoticed.
#[must_use]
pub fn display_datetime(raw: &str) -> String {
    let formatted = format_datetime(raw);
    if !formatted.is_formatted() {
        tracing::warn!(value = %raw, "Unrecognised timestamp from API, showing it verbatim");
    }
    formatted.into_string()
}

/// Like [`display_datetime`] for optional fields; blank stays `None`.
#[must_use]
pub fn display_optional(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty()).map(display_datetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(s: &str) -> DisplayDate {
        DisplayDate::Formatted(s.to_string())
    }

    #[test]
    fn test_utc_marker() {
        assert_eq!(
            format_datetime("2024-01-15T10:30:00Z"),
            formatted("15/01/2024 10:30")
        );
    }

    #[test]
    fn test_naive_timestamp() {
        assert_eq!(
            format_datetime("2024-01-15T10:30:00"),
            formatted("15/01/2024 10:30")
        );
        assert_eq!(
            format_datetime("2006-02-14 22:04:36"),
            formatted("14/02/2006 22:04")
        );
    }

    #[test]
    fn test_fractional_seconds_and_offset_keep_wall_clock() {
        assert_eq!(
            format_datetime("2024-01-15T23:59:59.123456+02:00"),
            formatted("15/01/2024 23:59")
        );
        assert_eq!(
            format_datetime("2005-05-24T22:53:30.000"),
            formatted("24/05/2005 22:53")
        );
    }

    #[test]
    fn test_minutes_only_and_bare_date() {
        assert_eq!(
            format_datetime("2024-01-15T10:30"),
            formatted("15/01/2024 10:30")
        );
        assert_eq!(format_datetime("2024-01-15"), formatted("15/01/2024 00:00"));
    }

    #[test]
    fn test_unparseable_returned_unchanged() {
        assert_eq!(
            format_datetime("yesterday"),
            DisplayDate::Unparsed("yesterday".to_string())
        );
        assert_eq!(
            format_datetime("2024-13-45T10:30:00Z"),
            DisplayDate::Unparsed("2024-13-45T10:30:00Z".to_string())
        );
        assert_eq!(display_datetime("yesterday"), "yesterday");
    }

    #[test]
    fn test_optional_blank_stays_missing() {
        assert_eq!(display_optional(None), None);
        assert_eq!(display_optional(Some("")), None);
        assert_eq!(
            display_optional(Some("2024-01-20T09:00:00Z")),
            Some("20/01/2024 09:00".to_string())
        );
    }
}
