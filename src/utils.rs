// Utility functions
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns the first keyword contained in `haystack`.
/// `haystack` must already be lower-cased; keywords are lower-cased here.
pub fn find_keyword<'a>(haystack: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .map(String::as_str)
        .find(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
}

/// Parses a provider timestamp. Accepts RFC 3339, a naive `YYYY-MM-DD HH:MM:SS`
/// (read as UTC) and a bare date (midnight UTC).
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    find_keyword(haystack, keywords).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(15.000000000000002), 15.0);
        assert_eq!(round2(-4.996), -5.0);
    }

    #[test]
    fn parses_provider_timestamps() {
        let rfc = parse_datetime("2026-10-01T12:30:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2026-10-01T10:30:00+00:00");
        let naive = parse_datetime("2026-10-01 10:30:00").unwrap();
        assert_eq!(naive, rfc);
        let date = parse_datetime("2026-10-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-10-01T00:00:00+00:00");
        assert_eq!(parse_datetime("gestern"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn keyword_lookup_ignores_empty_and_case() {
        let keywords = vec![String::new(), "Wie Neu".to_string()];
        assert_eq!(find_keyword("iphone wie neu", &keywords), Some("Wie Neu"));
        assert!(!contains_any("iphone", &keywords));
    }
}
