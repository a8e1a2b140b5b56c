//! The rate source abstraction implemented by every bank adapter.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateQuote, RateResult};
use chrono::NaiveDate;

/// A central bank that publishes daily foreign-exchange observations.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Full display name of the bank.
    fn bank_name(&self) -> &'static str;

    /// The bank's home currency code.
    fn home_currency(&self) -> &'static str;

    /// Currencies the bank publishes observations for.
    fn supported_currencies(&self) -> CurrencyTable;

    /// Whether the bank publishes observations for `currency`.
    fn supports(&self, currency: &str) -> bool {
        self.supported_currencies().contains(currency)
    }

    /// Quote for one unit of `currency` in the bank's home currency on
    /// `date`. When the bank published nothing for the requested day the
    /// adapter walks back one day at a time within a bounded window.
    async fn rate_on(&self, currency: &str, date: NaiveDate) -> RateResult<RateQuote>;
}
