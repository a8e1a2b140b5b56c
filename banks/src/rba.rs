//! Reserve Bank of Australia adapter, backed by the F11.1 statistical table.
//!
//! The bank publishes one CSV holding the full daily history, quoted as
//! foreign currency per Australian dollar. The adapter downloads the table
//! once per request and walks it locally, inverting each observation and
//! rounding to four decimal places.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const CSV_URL: &str = "https://www.rba.gov.au/statistics/tables/csv/f11.1-data.csv";
const BANK_NAME: &str = "Reserve Bank of Australia";
const HOME_CURRENCY: &str = "AUD";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("USD", "US dollar"),
    ("CNY", "Chinese renminbi"),
    ("JPY", "Japanese yen"),
    ("EUR", "European euro"),
    ("KRW", "South Korean won"),
    ("GBP", "UK pound sterling"),
    ("SGD", "Singapore dollar"),
    ("INR", "Indian rupee"),
    ("THB", "Thai baht"),
    ("NZD", "New Zealand dollar"),
    ("TWD", "Taiwanese dollar"),
    ("MYR", "Malaysian ringgit"),
    ("IDR", "Indonesian rupiah"),
    ("VND", "Vietnamese dong"),
    ("AED", "United Arab Emirates Dirham"),
    ("PGK", "Papua New Guinean Kina"),
    ("HKD", "Hong Kong dollar"),
    ("CAD", "Canadian dollar"),
    ("CHF", "Swiss franc"),
    ("SDR", "Unit of account of the IMF"),
]);

fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 3).expect("valid date")
}

/// Retrieves AUD exchange rates from the downloaded F11.1 table.
pub struct ReserveBankOfAustralia {
    client: reqwest::Client,
}

impl ReserveBankOfAustralia {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }
}

impl Default for ReserveBankOfAustralia {
    fn default() -> Self {
        Self::new()
    }
}

/// The F11.1 table keyed by observation date.
///
/// Column positions come from the `Units` header row, which names each
/// column with the currency code it carries.
struct RateTable {
    columns: HashMap<String, usize>,
    rows: BTreeMap<NaiveDate, Vec<Option<Decimal>>>,
}

impl RateTable {
    fn parse(text: &str) -> FetchResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut columns = HashMap::new();
        let mut rows = BTreeMap::new();
        for record in reader.records() {
            let record = record.map_err(FetchError::malformed)?;
            let Some(first) = record.get(0) else {
                continue;
            };
            if first == "Units" {
                for (index, cell) in record.iter().enumerate().skip(1) {
                    if !cell.is_empty() {
                        columns.insert(cell.to_string(), index);
                    }
                }
            } else if let Ok(date) = NaiveDate::parse_from_str(first, "%d-%b-%Y") {
                let cells = record
                    .iter()
                    .map(|cell| cell.parse::<Decimal>().ok())
                    .collect();
                rows.insert(date, cells);
            }
        }
        if columns.is_empty() {
            return Err(FetchError::Malformed("no Units header row".into()));
        }
        Ok(Self { columns, rows })
    }

    fn observation_on(&self, date: NaiveDate, currency: &str) -> Observation {
        let Some(&column) = self.columns.get(currency) else {
            return Observation::Missing;
        };
        let Some(cells) = self.rows.get(&date) else {
            return Observation::Missing;
        };
        match cells.get(column).copied().flatten() {
            Some(per_aud) if !per_aud.is_zero() => Observation::Found {
                rate: (Decimal::ONE / per_aud).round_dp(4),
                rate_date: date,
            },
            _ => Observation::Missing,
        }
    }
}

#[async_trait]
impl RateSource for ReserveBankOfAustralia {
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
        // date precondition comes first for this bank
        if date < min_date() {
            return Err(RateError::DateOutOfRange {
                min_date: min_date(),
            });
        }
        if !CURRENCIES.contains(currency) {
            return Err(RateError::UnsupportedCurrency {
                bank: BANK_NAME,
                currency: currency.to_string(),
            });
        }

        let table = match fetch::get_text(&self.client, CSV_URL).await {
            Ok(text) => match RateTable::parse(&text) {
                Ok(table) => table,
                Err(err) => {
                    warn!(bank = BANK_NAME, error = %err, "table parse failed, returning unresolved quote");
                    return Ok(RateQuote::unresolved(BANK_NAME, HOME_CURRENCY, date));
                }
            },
            Err(err) => {
                warn!(bank = BANK_NAME, error = %err, "download failed, returning unresolved quote");
                return Ok(RateQuote::unresolved(BANK_NAME, HOME_CURRENCY, date));
            }
        };

        let outcome = fallback::search_backward(date, DEFAULT_LOOKBACK_DAYS, |day| {
            let observation = table.observation_on(day, currency);
            async move { Ok::<_, FetchError>(observation) }
        })
        .await;
        match outcome {
            Ok(Some((rate, rate_date))) => {
                Ok(RateQuote::resolved(BANK_NAME, HOME_CURRENCY, rate, rate_date))
            }
            _ => Err(RateError::DataUnavailable {
                currency: currency.to_string(),
                requested: date,
                lookback_days: DEFAULT_LOOKBACK_DAYS,
            }),
        }
    }
}
