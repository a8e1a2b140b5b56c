//! Normalized rate quotes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::date::format_short;

/// A single foreign-exchange observation, normalized across banks.
///
/// `rate` is the price of one unit of the requested foreign currency in the
/// bank's home currency. `rate_date` is the date the observation was
/// actually published for, which may be earlier than the date requested
/// when the bank had no data for that day.
///
/// An unresolved quote carries the sentinel rate `-1` and echoes the
/// requested date; check [`RateQuote::is_resolved`] before using the rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    /// Name of the publishing bank.
    pub bank_name: &'static str,
    /// The bank's home currency code.
    pub home_currency: &'static str,
    /// Units of home currency per one unit of foreign currency.
    pub rate: Decimal,
    /// Date the observation applies to.
    pub rate_date: NaiveDate,
}

impl RateQuote {
    /// A resolved quote for an observation the bank actually published.
    pub fn resolved(
        bank_name: &'static str,
        home_currency: &'static str,
        rate: Decimal,
        rate_date: NaiveDate,
    ) -> Self {
        Self {
            bank_name,
            home_currency,
            rate,
            rate_date,
        }
    }

    /// An unresolved quote: sentinel rate `-1`, echoing the requested date.
    pub fn unresolved(
        bank_name: &'static str,
        home_currency: &'static str,
        requested: NaiveDate,
    ) -> Self {
        Self {
            bank_name,
            home_currency,
            rate: Decimal::NEGATIVE_ONE,
            rate_date: requested,
        }
    }

    /// Whether this quote carries a real published rate.
    pub fn is_resolved(&self) -> bool {
        self.rate > Decimal::ZERO
    }
}

impl std::fmt::Display for RateQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} on {} ({})",
            self.rate,
            self.home_currency,
            format_short(self.rate_date),
            self.bank_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolved_quote() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 8).unwrap();
        let quote = RateQuote::resolved("Bank of Canada", "CAD", dec!(1.3934), date);
        assert!(quote.is_resolved());
        assert_eq!(quote.rate, dec!(1.3934));
        assert_eq!(quote.rate_date, date);
    }

    #[test]
    fn test_unresolved_quote() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 10).unwrap();
        let quote = RateQuote::unresolved("Bank of Canada", "CAD", date);
        assert!(!quote.is_resolved());
        assert_eq!(quote.rate, dec!(-1));
        assert_eq!(quote.rate_date, date);
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 8).unwrap();
        let quote = RateQuote::resolved("Bank of Canada", "CAD", dec!(1.3934), date);
        assert_eq!(
            quote.to_string(),
            "1.3934 CAD on 08-May-2020 (Bank of Canada)"
        );
    }
}
