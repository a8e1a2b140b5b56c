//! Central Bank of Russia adapter, backed by the `DailyInfo` SOAP service.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const ENDPOINT: &str = "http://www.cbr.ru/DailyInfoWebServ/DailyInfo.asmx";
const SOAP_ACTION: &str = "\"http://web.cbr.ru/GetCursOnDate\"";
const BANK_NAME: &str = "Central bank of the Russian Federation";
const HOME_CURRENCY: &str = "RUB";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("AUD", "Australian dollar"),
    ("AZN", "Azerbaijan Manat"),
    ("AMD", "Armenia Dram"),
    ("BYN", "Belarussian Ruble"),
    ("BGN", "Bulgarian lev"),
    ("BRL", "Brazil Real"),
    ("HUF", "Hungarian forint"),
    ("KRW", "South Korean won"),
    ("HKD", "Hong Kong dollar"),
    ("DKK", "Danish Krone"),
    ("USD", "US dollar"),
    ("EUR", "Euro"),
    ("INR", "Indian rupee"),
    ("KZT", "Kazakhstan Tenge"),
    ("CAD", "Canadian dollar"),
    ("KGS", "Kyrgyzstan Som"),
    ("CNY", "Chinese yuan renminbi"),
    ("MDL", "Moldova Lei"),
    ("TMT", "New Turkmenistan Manat"),
    ("NOK", "Norwegian krone"),
    ("PLN", "Polish zloty"),
    ("RON", "Romanian leu"),
    ("XDR", "SDR"),
    ("SGD", "Singapore dollar"),
    ("TJS", "Tajikistan Ruble"),
    ("TRY", "Turkish lira"),
    ("UZS", "Uzbekistan Sum"),
    ("UAH", "Ukrainian Hryvnia"),
    ("GBP", "Pound sterling"),
    ("CZK", "Czech koruna"),
    ("SEK", "Swedish krona"),
    ("CHF", "Swiss franc"),
    ("ZAR", "South African rand"),
    ("JPY", "Japanese yen"),
]);

// first daily table published after the ruble redenomination series began
fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1992, 7, 1).expect("valid date")
}

/// Retrieves the daily currency table via the `GetCursOnDate` operation.
pub struct CentralBankOfRussia {
    client: reqwest::Client,
}

impl CentralBankOfRussia {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }

    async fn probe(&self, currency: &str, date: NaiveDate) -> FetchResult<Observation> {
        let body = fetch::send_text(
            self.client
                .post(ENDPOINT)
                .header("Content-Type", "text/xml; charset=utf-8")
                .header("SOAPAction", SOAP_ACTION)
                .body(request_envelope(date)),
        )
        .await?;
        parse_rate(&body, currency, date)
    }
}

impl Default for CentralBankOfRussia {
    fn default() -> Self {
        Self::new()
    }
}

fn request_envelope(date: NaiveDate) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap:Body>"#,
            r#"<GetCursOnDate xmlns="http://web.cbr.ru/">"#,
            "<On_date>{}</On_date>",
            "</GetCursOnDate></soap:Body></soap:Envelope>"
        ),
        date.format("%Y-%m-%d")
    )
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "soap:Body")]
    body: Body,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(rename = "GetCursOnDateResponse")]
    response: CursOnDateResponse,
}

#[derive(Debug, Deserialize)]
struct CursOnDateResponse {
    #[serde(rename = "GetCursOnDateResult")]
    result: CursOnDateResult,
}

#[derive(Debug, Deserialize)]
struct CursOnDateResult {
    #[serde(rename = "diffgr:diffgram")]
    diffgram: Diffgram,
}

#[derive(Debug, Deserialize)]
struct Diffgram {
    #[serde(rename = "ValuteData", default)]
    valute_data: Option<ValuteData>,
}

#[derive(Debug, Deserialize)]
struct ValuteData {
    #[serde(rename = "ValuteCursOnDate", default)]
    rows: Vec<ValuteRow>,
}

#[derive(Debug, Deserialize)]
struct ValuteRow {
    #[serde(rename = "Vnom")]
    nominal: Decimal,
    #[serde(rename = "Vcurs")]
    rate: Decimal,
    #[serde(rename = "VchCode")]
    code: String,
}

/// Quotes are published per `Vnom` units of the foreign currency, so the
/// unit rate is `Vcurs / Vnom`. A zero nominal is treated as one.
fn parse_rate(xml: &str, currency: &str, probed: NaiveDate) -> FetchResult<Observation> {
    let envelope: Envelope = quick_xml::de::from_str(xml).map_err(FetchError::malformed)?;
    let rows = envelope
        .body
        .response
        .result
        .diffgram
        .valute_data
        .map(|data| data.rows)
        .unwrap_or_default();
    if rows.is_empty() {
        // no table for this day yet, let the caller step back
        return Ok(Observation::Missing);
    }
    let Some(row) = rows.iter().find(|row| row.code.trim() == currency) else {
        return Ok(Observation::Missing);
    };
    let nominal = if row.nominal.is_zero() {
        Decimal::ONE
    } else {
        row.nominal
    };
    Ok(Observation::Found {
        rate: row.rate / nominal,
        rate_date: probed,
    })
}

#[async_trait]
impl RateSource for CentralBankOfRussia {
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

    const TABLE_PAYLOAD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetCursOnDateResponse xmlns="http://web.cbr.ru/">
      <GetCursOnDateResult>
        <xs:schema id="ValuteData" xmlns:xs="http://www.w3.org/2001/XMLSchema"/>
        <diffgr:diffgram xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1">
          <ValuteData>
            <ValuteCursOnDate>
              <Vname>US dollar</Vname>
              <Vnom>1</Vnom>
              <Vcurs>73.4321</Vcurs>
              <Vcode>840</Vcode>
              <VchCode>USD</VchCode>
            </ValuteCursOnDate>
            <ValuteCursOnDate>
              <Vname>Japanese yen</Vname>
              <Vnom>100</Vnom>
              <Vcurs>68.9500</Vcurs>
              <Vcode>392</Vcode>
              <VchCode>JPY</VchCode>
            </ValuteCursOnDate>
          </ValuteData>
        </diffgr:diffgram>
      </GetCursOnDateResult>
    </GetCursOnDateResponse>
  </soap:Body>
</soap:Envelope>"#;

    const EMPTY_PAYLOAD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <GetCursOnDateResponse xmlns="http://web.cbr.ru/">
      <GetCursOnDateResult>
        <diffgr:diffgram xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1"/>
      </GetCursOnDateResult>
    </GetCursOnDateResponse>
  </soap:Body>
</soap:Envelope>"#;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_unit_nominal() {
        let probed = date(2020, 5, 8);
        let observation = parse_rate(TABLE_PAYLOAD, "USD", probed).unwrap();
        assert_eq!(
            observation,
            Observation::Found {
                rate: dec!(73.4321),
                rate_date: probed,
            }
        );
    }

    #[test]
    fn test_parse_divides_by_nominal() {
        let observation = parse_rate(TABLE_PAYLOAD, "JPY", date(2020, 5, 8)).unwrap();
        let Observation::Found { rate, .. } = observation else {
            panic!("expected a published observation");
        };
        assert_eq!(rate, dec!(0.6895));
    }

    #[test]
    fn test_empty_table_is_missing() {
        let observation = parse_rate(EMPTY_PAYLOAD, "USD", date(2020, 5, 8)).unwrap();
        assert_eq!(observation, Observation::Missing);
    }

    #[test]
    fn test_request_envelope_carries_date() {
        let envelope = request_envelope(date(2020, 5, 8));
        assert!(envelope.contains("<On_date>2020-05-08</On_date>"));
        assert!(envelope.contains("GetCursOnDate"));
    }

    #[tokio::test]
    async fn test_unsupported_currency_is_rejected() {
        let bank = CentralBankOfRussia::new();
        let err = bank.rate_on("XXX", date(2020, 1, 8)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Central bank of the Russian Federation does not support XXX"
        );
    }

    #[tokio::test]
    async fn test_date_before_series_start_is_rejected() {
        let bank = CentralBankOfRussia::new();
        let err = bank.rate_on("USD", date(1991, 12, 31)).await.unwrap_err();
        assert_eq!(err.to_string(), "Date must be greater than 01-Jul-1992");
    }
}
