//! Registry-level checks across all bank adapters.

use bankfx_banks::{create, BankId};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn registry_constructs_every_bank() {
    let expected = [
        (BankId::Boc, "Bank of Canada", "CAD"),
        (BankId::Cbr, "Central bank of the Russian Federation", "RUB"),
        (BankId::Nbu, "National Bank of Ukraine", "UAH"),
        (BankId::Ecb, "European Central Bank", "EUR"),
        (BankId::Bomx, "Bank of Mexico", "MXN"),
        (BankId::Rba, "Reserve Bank of Australia", "AUD"),
        (BankId::Boe, "Bank of England", "GBP"),
    ];
    for (id, name, home) in expected {
        let bank = create(id, "test-token");
        assert_eq!(bank.bank_name(), name);
        assert_eq!(bank.home_currency(), home);
    }
}

#[test]
fn every_bank_supports_its_published_table() {
    for id in BankId::ALL {
        let bank = create(id, "test-token");
        for (code, _) in bank.supported_currencies().iter() {
            assert!(bank.supports(code), "{id}: {code} missing from supports");
        }
        assert!(!bank.supports("XXX"), "{id}: XXX should not be supported");
    }
}

#[tokio::test]
async fn unsupported_currency_is_rejected_without_network() {
    let bank = create(BankId::Boc, "");
    let err = bank.rate_on("XXX", date(2020, 5, 8)).await.unwrap_err();
    assert_eq!(err.to_string(), "Bank of Canada does not support XXX");
}
