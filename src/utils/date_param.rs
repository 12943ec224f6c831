//! Parsing of `finit` / `fend` query bounds.

use chrono::{DateTime, NaiveDate, Utc};

/// Parses a range bound from a query string.
///
/// Accepts RFC 3339 timestamps (`2024-01-15T10:00:00Z`, any offset) and plain
/// dates (`2024-01-15`), the latter interpreted as midnight UTC.
///
/// # Errors
///
/// Returns a description of the failure when the text matches neither format.
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date", raw))
}

/// Parses an optional bound, treating an empty string as absent.
pub fn parse_optional_bound(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date_bound(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_plain_date_is_midnight_utc() {
        assert_eq!(
            parse_date_bound("2024-01-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rfc3339_with_offset_is_normalized() {
        assert_eq!(
            parse_date_bound("2024-01-15T06:00:00-06:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_bound() {
        assert!(parse_date_bound("15/01/2024").is_err());
        assert!(parse_date_bound("yesterday").is_err());
    }

    #[test]
    fn test_optional_bound() {
        assert_eq!(parse_optional_bound(None).unwrap(), None);
        assert_eq!(parse_optional_bound(Some("")).unwrap(), None);
        assert!(parse_optional_bound(Some("2024-02-01")).unwrap().is_some());
        assert!(parse_optional_bound(Some("nope")).is_err());
    }
}
