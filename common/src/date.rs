//! Date formatting helpers.

use chrono::NaiveDate;

/// Format a date as `dd-MMM-yyyy`, e.g. `03-Jan-2017`.
///
/// This is the display format used in error messages and CLI output.
pub fn format_short(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short() {
        let date = NaiveDate::from_ymd_opt(2017, 1, 3).unwrap();
        assert_eq!(format_short(date), "03-Jan-2017");
    }

    #[test]
    fn test_format_short_december() {
        let date = NaiveDate::from_ymd_opt(2020, 12, 25).unwrap();
        assert_eq!(format_short(date), "25-Dec-2020");
    }
}
