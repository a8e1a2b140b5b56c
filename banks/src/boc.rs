//! Bank of Canada adapter, backed by the Valet observations API.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const BASE_URL: &str = "https://www.bankofcanada.ca/valet";
const BANK_NAME: &str = "Bank of Canada";
const HOME_CURRENCY: &str = "CAD";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("AUD", "Australian dollar"),
    ("BRL", "Brazilian real"),
    ("CNY", "Chinese renminbi"),
    ("EUR", "European euro"),
    ("HKD", "Hong Kong dollar"),
    ("INR", "Indian rupee"),
    ("IDR", "Indonesian rupiah"),
    ("JPY", "Japanese yen"),
    ("MYR", "Malaysian ringgit"),
    ("MXN", "Mexican peso"),
    ("NZD", "New Zealand dollar"),
    ("NOK", "Norwegian krone"),
    ("PEN", "Peruvian new sol"),
    ("RUB", "Russian ruble"),
    ("SAR", "Saudi riyal"),
    ("SGD", "Singapore dollar"),
    ("ZAR", "South African rand"),
    ("KRW", "South Korean won"),
    ("SEK", "Swedish krona"),
    ("CHF", "Swiss franc"),
    ("TWD", "Taiwanese dollar"),
    ("THB", "Thai baht"),
    ("TRY", "Turkish lira"),
    ("GBP", "UK pound sterling"),
    ("USD", "US dollar"),
    ("VND", "Vietnamese dong"),
]);

fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 3).expect("valid date")
}

/// Retrieves noon rates from the Valet `observations` endpoint.
pub struct BankOfCanada {
    client: reqwest::Client,
}

impl BankOfCanada {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }

    async fn probe(&self, series: &str, date: NaiveDate) -> FetchResult<Observation> {
        let day = date.format("%Y-%m-%d");
        let url = format!("{BASE_URL}/observations/{series}?start_date={day}&end_date={day}");
        let body = fetch::get_text(&self.client, &url).await?;
        parse_observation(&body, series, date)
    }
}

impl Default for BankOfCanada {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ValetResponse {
    observations: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn parse_observation(body: &str, series: &str, probed: NaiveDate) -> FetchResult<Observation> {
    let response: ValetResponse = serde_json::from_str(body).map_err(FetchError::malformed)?;
    let Some(first) = response.observations.first() else {
        return Ok(Observation::Missing);
    };
    let value = first
        .get(series)
        .and_then(|v| v.get("v"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchError::Malformed(format!("observation missing {series}.v")))?;
    let rate = value.parse::<Decimal>().map_err(FetchError::malformed)?;
    Ok(Observation::Found {
        rate,
        rate_date: probed,
    })
}

#[async_trait]
impl RateSource for BankOfCanada {
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

        let series = format!("FX{currency}CAD");
        let outcome =
            fallback::search_backward(date, DEFAULT_LOOKBACK_DAYS, |day| self.probe(&series, day))
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
