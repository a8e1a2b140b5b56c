//! Bank of Mexico adapter, backed by the SIE REST API.
//!
//! SIE requires a per-caller token, passed in the `Bmx-Token` header.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1/series";
const TOKEN_HEADER: &str = "Bmx-Token";
const BANK_NAME: &str = "Bank of Mexico";
const HOME_CURRENCY: &str = "MXN";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("CAD", "Canadian dollar"),
    ("EUR", "European euro"),
    ("JPY", "Japanese yen"),
    ("GBP", "UK pound sterling"),
    ("USD", "US dollar"),
    ("CNY", "Chinese yuan"),
]);

// start of the SF46405 FIX series
fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1991, 11, 8).expect("valid date")
}

fn series_for(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" => Some("SF46405"),
        "EUR" => Some("SF46410"),
        "CAD" => Some("SF60632"),
        "JPY" => Some("SF46406"),
        "GBP" => Some("SF46407"),
        "CNY" => Some("SF290383"),
        _ => None,
    }
}

/// Retrieves observations from one SIE series per currency.
pub struct BankOfMexico {
    client: reqwest::Client,
    token: String,
}

impl BankOfMexico {
    /// `token` is issued by the SIE token service.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: fetch::client(),
            token: token.into(),
        }
    }

    async fn probe(&self, series: &str, date: NaiveDate) -> FetchResult<Observation> {
        let day = date.format("%Y-%m-%d");
        let url = format!("{BASE_URL}/{series}/datos/{day}/{day}?locale=en");
        let body =
            fetch::send_text(self.client.get(&url).header(TOKEN_HEADER, &self.token)).await?;
        parse_observation(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: Bmx,
}

#[derive(Debug, Deserialize)]
struct Bmx {
    #[serde(default)]
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(default)]
    datos: Option<Vec<SieDatum>>,
}

#[derive(Debug, Deserialize)]
struct SieDatum {
    fecha: String,
    dato: String,
}

fn parse_observation(body: &str) -> FetchResult<Observation> {
    let response: SieResponse = serde_json::from_str(body).map_err(FetchError::malformed)?;
    let Some(series) = response.bmx.series.first() else {
        return Err(FetchError::Malformed("response carries no series".into()));
    };
    let Some(datum) = series.datos.as_deref().and_then(<[SieDatum]>::first) else {
        return Ok(Observation::Missing);
    };
    // unavailable observations are reported as "N/E"
    let Ok(rate) = datum.dato.parse::<Decimal>() else {
        return Ok(Observation::Missing);
    };
    let rate_date =
        NaiveDate::parse_from_str(&datum.fecha, "%d/%m/%Y").map_err(FetchError::malformed)?;
    Ok(Observation::Found { rate, rate_date })
}

#[async_trait]
impl RateSource for BankOfMexico {
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
        let Some(series) = series_for(currency) else {
            return Err(RateError::UnsupportedCurrency {
                bank: BANK_NAME,
                currency: currency.to_string(),
            });
        };
        if date < min_date() {
            return Err(RateError::DateOutOfRange {
                min_date: min_date(),
            });
        }

        let outcome =
            fallback::search_backward(date, DEFAULT_LOOKBACK_DAYS, |day| self.probe(series, day))
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
