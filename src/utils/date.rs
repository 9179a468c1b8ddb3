//! Date utilities: permissive parsing of free-text dates and the
//! canonical `MM/DD/YYYY` rendering used on disk.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

pub const CANONICAL_DATE: &str = "%m/%d/%Y";

pub fn format_canonical(d: NaiveDate) -> String {
    d.format(CANONICAL_DATE).to_string()
}

/// Parse a free-text date. Month-first wins for ambiguous numeric forms.
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // `%Y` accepts any digit count, so "01-05-24" would otherwise read as year 1.
    let plausible = |d: NaiveDate| d.year() >= 1000;

    let dt_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in dt_formats.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt)
            && plausible(dt.date())
        {
            return Some(dt.date());
        }
    }

    let date_formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%m-%d-%Y",
        "%Y/%m/%d",
        "%b %d, %Y",
        "%B %d, %Y",
        "%b %d %Y",
        "%B %d %Y",
        "%d %b %Y",
        "%d %B %Y",
        "%d-%b-%Y",
    ];
    for fmt in date_formats.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt)
            && plausible(d)
        {
            return Some(d);
        }
    }

    for fmt in ["%m/%d/%y", "%m-%d-%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// Spreadsheet serial day number (epoch 1899-12-30) to a date.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn accepts_common_spellings() {
        let expected = ymd(2024, 1, 5);
        for raw in [
            "2024-01-05",
            "01/05/2024",
            "1/5/2024",
            "2024/01/05",
            "01-05-2024",
            "Jan 5, 2024",
            "January 5, 2024",
            "5 Jan 2024",
            "2024-01-05 14:30:00",
            "2024-01-05T14:30:00+05:30",
            "01/05/24",
        ] {
            assert_eq!(parse_loose_date(raw), Some(expected), "{raw}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_loose_date(""), None);
        assert_eq!(parse_loose_date("next tuesday"), None);
        assert_eq!(parse_loose_date("13/45/2024"), None);
    }

    #[test]
    fn serial_numbers() {
        assert_eq!(from_serial(45296.0), Some(ymd(2024, 1, 5)));
        assert_eq!(from_serial(45296.75), Some(ymd(2024, 1, 5)));
        assert_eq!(from_serial(-3.0), None);
    }
}
