//! Bank of England adapter, backed by the statistical database rates page.
//!
//! There is no machine-readable endpoint for daily spot rates, so the
//! adapter scrapes the HTML table. An error paragraph inside the editorial
//! block marks days without published rates and drives the date fallback;
//! the true observation date is taken from the table header.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const BASE_URL: &str = "https://www.bankofengland.co.uk/boeapps/database/Rates.asp";
const BANK_NAME: &str = "Bank of England";
const HOME_CURRENCY: &str = "GBP";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CNY", "Chinese Yuan"),
    ("CZK", "Czech Koruna"),
    ("DKK", "Danish Krone"),
    ("EUR", "Euro"),
    ("HKD", "Hong Kong Dollar"),
    ("HUF", "Hungarian Forint"),
    ("INR", "Indian Rupee"),
    ("ILS", "Israeli Shekel"),
    ("JPY", "Japanese Yen"),
    ("MYR", "Malaysian ringgit"),
    ("NZD", "Zealand Dollar"),
    ("NOK", "Norwegian Krone"),
    ("PLN", "Polish Zloty"),
    ("RUB", "Russian Ruble"),
    ("SAR", "Saudi Riyal"),
    ("SGD", "Singapore Dollar"),
    ("ZAR", "South African Rand"),
    ("KRW", "South Korean Won"),
    ("SEK", "Swedish Krona"),
    ("CHF", "Swiss Franc"),
    ("TWD", "Taiwan Dollar"),
    ("THB", "Thai Baht"),
    ("TRY", "Turkish Lira"),
    ("USD", "US Dollar"),
]);

fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 4).expect("valid date")
}

/// Scrapes daily spot rates against sterling.
pub struct BankOfEngland {
    client: reqwest::Client,
}

impl BankOfEngland {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }

    async fn probe(&self, currency: &str, date: NaiveDate) -> FetchResult<Observation> {
        let url = format!(
            "{BASE_URL}?TD={}&TM={}&TY={}&into=GBP&rateview=D",
            date.format("%d"),
            date.format("%b"),
            date.format("%Y")
        );
        let body = fetch::get_text(&self.client, &url).await?;
        parse_page(&body, currency, date)
    }
}

impl Default for BankOfEngland {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn cell_text(cell: scraper::ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn parse_page(html: &str, currency: &str, probed: NaiveDate) -> FetchResult<Observation> {
    let document = Html::parse_document(html);

    if document.select(&selector("#editorial p.error")).next().is_some() {
        return Ok(Observation::Missing);
    }

    // the second header cell carries the date the table was published for
    let header_date = document
        .select(&selector("#editorial table thead tr th"))
        .nth(1)
        .and_then(|th| NaiveDate::parse_from_str(cell_text(th).trim(), "%d %b %Y").ok());

    let cells = selector("td");
    for row in document.select(&selector("#editorial table tr")) {
        let columns: Vec<String> = row.select(&cells).map(cell_text).collect();
        let [name, value, ..] = columns.as_slice() else {
            continue;
        };
        let matches = CURRENCIES
            .code_for_name(name)
            .map_or(false, |code| code == currency);
        if !matches {
            continue;
        }
        let rate = value.parse::<Decimal>().map_err(FetchError::malformed)?;
        return Ok(Observation::Found {
            rate,
            rate_date: header_date.unwrap_or(probed),
        });
    }

    Err(FetchError::Malformed(format!(
        "no row for {currency} in rates table"
    )))
}

#[async_trait]
impl RateSource for BankOfEngland {
    fn bank_name(&self) -> &'static str {
        BANK_NAME
    }

    fn home_currency(&self) -> &'static str {
        HOME_CURRENCY
    }

    fn supported_currencies(&self) -> CurrencyTable {
        CURRENCIES
    }

    async fn rate_on(&self, currency: &str, date: NaiveDate) -> RateResult<RateQuote> {
        if !CURRENCIES.contains(currency) {
            return Err(RateError::UnsupportedCurrency {
                bank: BANK_NAME,
                currency: currency.to_string(),
            });
        }
        if date < min_date() {
            return Err(RateError::DateOutOfRange {
                min_date: min_date(),
            });
        }

        let outcome =
            fallback::search_backward(date, DEFAULT_LOOKBACK_DAYS, |day| self.probe(currency, day))
                .await;
        match outcome {
            Ok(Some((rate, rate_date))) => {
                Ok(RateQuote::resolved(BANK_NAME, HOME_CURRENCY, rate, rate_date))
            }
            Ok(None) => Err(RateError::DataUnavailable {
                currency: currency.to_string(),
                requested: date,
                lookback_days: DEFAULT_LOOKBACK_DAYS,
            }),
            Err(err) => {
                warn!(bank = BANK_NAME, %currency, error = %err, "request failed, returning unresolved quote");
                Ok(RateQuote::unresolved(BANK_NAME, HOME_CURRENCY, date))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const RATES_PAGE: &str = r#"<html><body>
<div id="editorial">
  <h1>Daily spot exchange rates against Sterling</h1>
  <table>
    <thead>
      <tr><th>Currency</th><th>04 Jan 2010</th></tr>
    </thead>
    <tr><td>Euro</td><td>1.1226</td></tr>
    <tr><td>US Dollar</td><td>1.6121</td></tr>
  </table>
</div>
</body></html>"#;

    const ERROR_PAGE: &str = r#"<html><body>
<div id="editorial">
  <p class="error">No data available for the date requested</p>
</div>
</body></html>"#;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_matches_display_name_and_header_date() {
        let observation = parse_page(RATES_PAGE, "USD", date(2010, 1, 6)).unwrap();
        assert_eq!(
            observation,
            Observation::Found {
                rate: dec!(1.6121),
                rate_date: date(2010, 1, 4),
            }
        );
    }

    #[test]
    fn test_error_marker_is_missing() {
        let observation = parse_page(ERROR_PAGE, "USD", date(2010, 1, 2)).unwrap();
        assert_eq!(observation, Observation::Missing);
    }

    #[test]
    fn test_absent_row_is_malformed() {
        // MYR is supported but not in this page's table
        assert!(parse_page(RATES_PAGE, "MYR", date(2010, 1, 4)).is_err());
    }

    #[tokio::test]
    async fn test_unsupported_currency_is_rejected() {
        let bank = BankOfEngland::new();
        let err = bank.rate_on("XXX", date(2020, 1, 8)).await.unwrap_err();
        assert_eq!(err.to_string(), "Bank of England does not support XXX");
    }

    #[tokio::test]
    async fn test_date_before_series_start_is_rejected() {
        let bank = BankOfEngland::new();
        let err = bank.rate_on("USD", date(2010, 1, 1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Date must be greater than 04-Jan-2010");
    }
}
