//! Calendar date extraction from heterogeneous order timestamps
//!
//! The sources disagree on timestamp shape. Four layouts occur in the
//! snapshots, tried in this order:
//!
//! 1. ISO: `2024-03-01` (optionally followed by a time-of-day)
//! 2. US two-digit year: `03/01/24` (month/day/year, 2000s assumed)
//! 3. European dotted: `1.03.2024` (day.month.year)
//! 4. Text month: `1-March-2024` or `1-Mar-2024`
//!
//! Everything reduces to a `chrono::NaiveDate`; outward formatting is always
//! `YYYY-MM-DD`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
static US_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{2})").unwrap());
static EURO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})\.(\d{2})\.(\d{4})").unwrap());
static TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})-([A-Za-z]+)-(\d{4})").unwrap());

/// Month number from an English month name or its 3-letter prefix
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    match prefix {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// Extract the transaction date from a raw timestamp value.
///
/// Returns `None` when no layout matches or the matched digits do not form
/// a real calendar date; the caller records the row as a normalization
/// error.
pub fn parse_transaction_date(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_RE.captures(raw) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = US_RE.captures(raw) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse::<i32>().ok()? + 2000;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = EURO_RE.captures(raw) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = TEXT_RE.captures(raw) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_with_time_of_day() {
        assert_eq!(
            parse_transaction_date("2024-03-01 10:22:33"),
            Some(date(2024, 3, 1))
        );
    }

    #[test]
    fn us_two_digit_year() {
        assert_eq!(parse_transaction_date("03/01/24"), Some(date(2024, 3, 1)));
    }

    #[test]
    fn european_dotted() {
        assert_eq!(parse_transaction_date("1.03.2024"), Some(date(2024, 3, 1)));
    }

    #[test]
    fn text_month_full_and_abbreviated() {
        assert_eq!(
            parse_transaction_date("1-March-2024"),
            Some(date(2024, 3, 1))
        );
        assert_eq!(parse_transaction_date("1-Mar-2024"), Some(date(2024, 3, 1)));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(parse_transaction_date("13/45/99"), None);
        assert_eq!(parse_transaction_date("2024-02-30"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_transaction_date("sometime soon"), None);
        assert_eq!(parse_transaction_date(""), None);
    }
}
