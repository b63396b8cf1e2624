//! Publication date parsing and display.
//!
//! The content API reports timestamps like `2021-03-25T19:25:28+0000` (no
//! colon in the offset), so RFC 3339 parsing alone is not enough. Dates are
//! kept as `DateTime<Utc>` until render time and formatted exactly once there,
//! as `dd MMM yyyy` with Brazilian Portuguese month abbreviations.

use chrono::{DateTime, Locale, Utc};

const DISPLAY_FORMAT: &str = "%d %b %Y";

/// Parse a content API timestamp. Returns `None` for anything unparseable.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a publication date for display, e.g. `25 mar 2021`.
///
/// Missing dates render as an empty string.
pub fn format_publication_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(d) => d.format_localized(DISPLAY_FORMAT, Locale::pt_BR).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn parses_offset_without_colon() {
        let d = parse_publication_date("2021-03-25T19:25:28+0000").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());
    }

    #[test]
    fn parses_rfc3339() {
        let d = parse_publication_date("2021-03-25T19:25:28Z").unwrap();
        assert_eq!(d.day(), 25);
    }

    #[test]
    fn normalizes_to_utc() {
        let d = parse_publication_date("2021-03-01T01:00:00+0300").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2021, 2, 28, 22, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_publication_date("yesterday"), None);
        assert_eq!(parse_publication_date(""), None);
    }

    #[test]
    fn formats_with_portuguese_month() {
        let d = Utc.with_ymd_and_hms(2021, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(format_publication_date(Some(&d)), "05 mar 2021");

        let d = Utc.with_ymd_and_hms(2020, 9, 19, 0, 0, 0).unwrap();
        assert_eq!(format_publication_date(Some(&d)), "19 set 2020");
    }

    #[test]
    fn every_month_abbreviation() {
        let months: Vec<String> = (1..=12)
            .map(|m| {
                let d = Utc.with_ymd_and_hms(2021, m, 10, 12, 0, 0).unwrap();
                format_publication_date(Some(&d))
            })
            .collect();
        assert_eq!(
            months,
            [
                "10 jan 2021", "10 fev 2021", "10 mar 2021", "10 abr 2021", "10 mai 2021",
                "10 jun 2021", "10 jul 2021", "10 ago 2021", "10 set 2021", "10 out 2021",
                "10 nov 2021", "10 dez 2021",
            ]
        );
    }

    #[test]
    fn missing_date_formats_empty() {
        assert_eq!(format_publication_date(None), "");
    }
}
