//! ISO-8601 handling for wire payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an ISO-8601 instant as sent by the API.
///
/// Accepts RFC 3339 (with offset or `Z`), a naive date-time which is taken as
/// UTC, and a bare `YYYY-MM-DD` which becomes UTC midnight.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_instant("2024-05-01T09:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_millisecond_zulu() {
        let parsed = parse_instant("2024-05-01T09:30:00.000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert_eq!(
            parse_instant("2024-05-01T09:30:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_instant("2024-05-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_instant("next tuesday").is_none());
        assert!(parse_instant("").is_none());
    }
}
