//! European Central Bank adapter, backed by the SDMX REST data service.
//!
//! The EXR flow quotes foreign currency per euro, so the published value is
//! inverted to euros per unit of foreign currency and rounded to four
//! decimal places.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const BASE_URL: &str = "https://sdw-wsrest.ecb.europa.eu/service";
const FLOW: &str = "EXR";
const BANK_NAME: &str = "European Central Bank";
const HOME_CURRENCY: &str = "EUR";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("USD", "US dollar"),
    ("JPY", "Japanese yen"),
    ("BGN", "Bulgarian lev"),
    ("CZK", "Czech koruna"),
    ("DKK", "Danish krone"),
    ("GBP", "Pound sterling"),
    ("HUF", "Hungarian forint"),
    ("PLN", "Polish zloty"),
    ("RON", "Romanian leu"),
    ("SEK", "Swedish krona"),
    ("CHF", "Swiss franc"),
    ("ISK", "Icelandic krona"),
    ("NOK", "Norwegian krone"),
    ("HRK", "Croatian kuna"),
    ("RUB", "Russian rouble"),
    ("TRY", "Turkish lira"),
    ("AUD", "Australian dollar"),
    ("BRL", "Brazilian real"),
    ("CAD", "Canadian dollar"),
    ("CNY", "Chinese yuan renminbi"),
    ("HKD", "Hong Kong dollar"),
    ("IDR", "Indonesian rupiah"),
    ("ILS", "Israeli shekel"),
    ("INR", "Indian rupee"),
    ("KRW", "South Korean won"),
    ("MXN", "Mexican peso"),
    ("MYR", "Malaysian ringgit"),
    ("NZD", "New Zealand dollar"),
    ("PHP", "Philippine peso"),
    ("SGD", "Singapore dollar"),
    ("THB", "Thai baht"),
    ("ZAR", "South African rand"),
]);

fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1999, 1, 4).expect("valid date")
}

/// Retrieves daily reference rates from the `EXR` dataflow.
pub struct EuropeanCentralBank {
    client: reqwest::Client,
}

impl EuropeanCentralBank {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }

    async fn probe(&self, currency: &str, date: NaiveDate) -> FetchResult<Observation> {
        let day = date.format("%Y-%m-%d");
        let url = format!(
            "{BASE_URL}/data/{FLOW}/D.{currency}.EUR.SP00.A?startPeriod={day}&endPeriod={day}"
        );
        match fetch::get_text(&self.client, &url).await {
            Ok(body) => parse_observation(&body, date),
            // the service answers 404 when the flow has no data in the window
            Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND)) => Ok(Observation::Missing),
            Err(err) => Err(err),
        }
    }
}

impl Default for EuropeanCentralBank {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GenericData {
    #[serde(rename = "message:DataSet", default)]
    data_set: Option<DataSet>,
}

#[derive(Debug, Deserialize)]
struct DataSet {
    #[serde(rename = "generic:Series", default)]
    series: Vec<Series>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(rename = "generic:Obs", default)]
    observations: Vec<Obs>,
}

#[derive(Debug, Deserialize)]
struct Obs {
    #[serde(rename = "generic:ObsValue", default)]
    value: Option<ValueAttr>,
}

#[derive(Debug, Deserialize)]
struct ValueAttr {
    #[serde(rename = "@value")]
    value: String,
}

fn parse_observation(xml: &str, probed: NaiveDate) -> FetchResult<Observation> {
    if xml.trim().is_empty() {
        return Ok(Observation::Missing);
    }
    let data: GenericData = quick_xml::de::from_str(xml).map_err(FetchError::malformed)?;
    let raw = data
        .data_set
        .iter()
        .flat_map(|set| &set.series)
        .flat_map(|series| &series.observations)
        .find_map(|obs| obs.value.as_ref());
    let Some(value) = raw else {
        return Ok(Observation::Missing);
    };
    let per_euro = value.value.parse::<Decimal>().map_err(FetchError::malformed)?;
    if per_euro.is_zero() {
        return Err(FetchError::Malformed("zero observation value".into()));
    }
    Ok(Observation::Found {
        rate: (Decimal::ONE / per_euro).round_dp(4),
        rate_date: probed,
    })
}

#[async_trait]
impl RateSource for EuropeanCentralBank {
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
