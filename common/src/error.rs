//! Error types for rate retrieval.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced to callers of a rate source.
///
/// Transport and payload failures are not represented here: adapters
/// swallow those and return an unresolved quote instead, so this enum only
/// covers conditions the caller can act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// The bank does not publish rates for the requested currency.
    #[error("{bank} does not support {currency}")]
    UnsupportedCurrency { bank: &'static str, currency: String },

    /// The requested date precedes the start of the bank's series.
    #[error("Date must be greater than {}", crate::date::format_short(*min_date))]
    DateOutOfRange { min_date: NaiveDate },

    /// No observation was published within the lookback window.
    #[error("No {currency} rate published within {lookback_days} days of {}", crate::date::format_short(*requested))]
    DataUnavailable {
        currency: String,
        requested: NaiveDate,
        lookback_days: u32,
    },
}

/// Result type alias for rate retrieval operations.
pub type RateResult<T> = std::result::Result<T, RateError>;
