//! National Bank of Ukraine adapter, backed by the `statdirectory` API.
//!
//! Unlike the other banks this service never rejects a request: dates
//! before the series start and unsupported currencies both yield an
//! unresolved quote.

use async_trait::async_trait;
use bankfx_common::{CurrencyTable, RateError, RateQuote, RateResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::fallback::{self, Observation, DEFAULT_LOOKBACK_DAYS};
use crate::fetch::{self, FetchError, FetchResult};
use crate::source::RateSource;

const BASE_URL: &str = "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange";
const BANK_NAME: &str = "National Bank of Ukraine";
const HOME_CURRENCY: &str = "UAH";

static CURRENCIES: CurrencyTable = CurrencyTable::new(&[
    ("AUD", "(036) - Австралійський долар"),
    ("CAD", "(124) - Канадський долар"),
    ("CNY", "(156) - Юань Женьмiньбi"),
    ("HRK", "(191) - Куна"),
    ("CZK", "(203) - Чеська крона"),
    ("DKK", "(208) - Данська крона"),
    ("HKD", "(344) - Гонконгівський долар"),
    ("HUF", "(348) - Форинт"),
    ("INR", "(356) - Індійська рупія"),
    ("IDR", "(360) - Рупія"),
    ("IRR", "(364) - Іранський ріал"),
    ("ILS", "(376) - Новий ізраїльський шекель"),
    ("JPY", "(392) - Єна"),
    ("KZT", "(398) - Теньге"),
    ("KRW", "(410) - Вона"),
    ("MXN", "(484) - Мексіканський песо"),
    ("MDL", "(498) - Молдовський лей"),
    ("NZD", "(554) - Новозеландський долар"),
    ("NOK", "(578) - Норвезька крона"),
    ("RUB", "(643) - Російський рубль"),
    ("SAR", "(682) - Саудівський рiял"),
    ("SGD", "(702) - Сінгапурський долар"),
    ("ZAR", "(710) - Ренд"),
    ("SEK", "(752) - Шведська крона"),
    ("CHF", "(756) - Швейцарський франк"),
    ("EGP", "(818) - Єгипетський фунт"),
    ("GBP", "(826) - Фунт стерлінгів"),
    ("USD", "(840) - Долар США"),
    ("BYN", "(933) - Бiлоруський рубль"),
    ("AZN", "(944) - Азербайджанський манат"),
    ("RON", "(946) - Румунський лей"),
    ("TRY", "(949) - Турецька ліра"),
    ("XDR", "(960) - СПЗ(спеціальні права запозичення)"),
    ("BGN", "(975) - Болгарський лев"),
    ("EUR", "(978) - Євро"),
    ("PLN", "(985) - Злотий"),
    ("DZD", "(012) - Алжирський динар"),
    ("BDT", "(050) - Така"),
    ("AMD", "(051) - Вiрменський драм"),
    ("IQD", "(368) - Іракський динар"),
    ("KGS", "(417) - Сом"),
    ("LBP", "(422) - Ліванський фунт"),
    ("LYD", "(434) - Лівійський динар"),
    ("MYR", "(458) - Малайзійський ринггіт"),
    ("MAD", "(504) - Марокканський дирхам"),
    ("PKR", "(586) - Пакистанська рупія"),
    ("VND", "(704) - Донг"),
    ("THB", "(764) - Бат"),
    ("AED", "(784) - Дирхам ОАЕ"),
    ("TND", "(788) - Туніський динар"),
    ("UZS", "(860) - Узбецький сум"),
    ("TWD", "(901) - Новий тайванський долар"),
    ("TMT", "(934) - Туркменський новий манат"),
    ("GHS", "(936) - Ганських седі"),
    ("RSD", "(941) - Сербський динар"),
    ("TJS", "(972) - Сомонi"),
    ("GEL", "(981) - Ларi"),
    ("XAU", "(959) - Золото"),
    ("XAG", "(961) - Срiбло"),
    ("XPT", "(962) - Платина"),
    ("XPD", "(964) - Паладiй"),
]);

fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1996, 1, 6).expect("valid date")
}

/// Retrieves official UAH exchange rates.
pub struct NationalBankOfUkraine {
    client: reqwest::Client,
}

impl NationalBankOfUkraine {
    pub fn new() -> Self {
        Self {
            client: fetch::client(),
        }
    }

    async fn probe(&self, currency: &str, date: NaiveDate) -> FetchResult<Observation> {
        let url = format!(
            "{BASE_URL}?valcode={currency}&date={}&json",
            date.format("%Y%m%d")
        );
        let body = fetch::get_text(&self.client, &url).await?;
        parse_observation(&body)
    }
}

impl Default for NationalBankOfUkraine {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRow {
    rate: Decimal,
    exchangedate: String,
}

fn parse_observation(body: &str) -> FetchResult<Observation> {
    let rows: Vec<ExchangeRow> = serde_json::from_str(body).map_err(FetchError::malformed)?;
    let Some(first) = rows.first() else {
        return Ok(Observation::Missing);
    };
    let rate_date = NaiveDate::parse_from_str(&first.exchangedate, "%d.%m.%Y")
        .map_err(FetchError::malformed)?;
    Ok(Observation::Found {
        rate: first.rate,
        rate_date,
    })
}

#[async_trait]
impl RateSource for NationalBankOfUkraine {
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
        if date < min_date() {
            debug!(bank = BANK_NAME, %date, "date precedes series start, returning unresolved quote");
            return Ok(RateQuote::unresolved(BANK_NAME, HOME_CURRENCY, date));
        }
        if !CURRENCIES.contains(currency) {
            debug!(bank = BANK_NAME, %currency, "currency not published, returning unresolved quote");
            return Ok(RateQuote::unresolved(BANK_NAME, HOME_CURRENCY, date));
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

    const USD_PAYLOAD: &str = r#"[
        {"r030": 840, "txt": "Долар США", "rate": 26.8943, "cc": "USD", "exchangedate": "08.05.2020"}
    ]"#;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_observation() {
        let observation = parse_observation(USD_PAYLOAD).unwrap();
        assert_eq!(
            observation,
            Observation::Found {
                rate: dec!(26.8943),
                rate_date: date(2020, 5, 8),
            }
        );
    }

    #[test]
    fn test_empty_array_is_missing() {
        assert_eq!(parse_observation("[]").unwrap(), Observation::Missing);
    }

    #[test]
    fn test_garbage_payload_is_malformed() {
        assert!(parse_observation("{\"message\":\"oops\"}").is_err());
    }

    #[tokio::test]
    async fn test_date_before_series_start_clamps_to_unresolved() {
        let bank = NationalBankOfUkraine::new();
        let requested = date(1995, 12, 31);
        let quote = bank.rate_on("USD", requested).await.unwrap();
        assert!(!quote.is_resolved());
        assert_eq!(quote.rate_date, requested);
    }

    #[tokio::test]
    async fn test_unsupported_currency_clamps_to_unresolved() {
        let bank = NationalBankOfUkraine::new();
        let requested = date(2020, 5, 8);
        let quote = bank.rate_on("XXX", requested).await.unwrap();
        assert!(!quote.is_resolved());
        assert_eq!(quote.rate, dec!(-1));
    }
}
