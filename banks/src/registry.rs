//! Stable bank identifiers and adapter construction.
//!
//! Identifiers carry fixed ordinals so that downstream configuration and
//! serialized references stay valid across releases.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::boc::BankOfCanada;
use crate::boe::BankOfEngland;
use crate::bomx::BankOfMexico;
use crate::cbr::CentralBankOfRussia;
use crate::ecb::EuropeanCentralBank;
use crate::nbu::NationalBankOfUkraine;
use crate::rba::ReserveBankOfAustralia;
use crate::source::RateSource;

/// Every bank the crate can query, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BankId {
    Boc = 0,
    Cbr = 1,
    Nbu = 2,
    Ecb = 3,
    Bomx = 4,
    Rba = 5,
    Boe = 6,
}

impl BankId {
    pub const ALL: [BankId; 7] = [
        BankId::Boc,
        BankId::Cbr,
        BankId::Nbu,
        BankId::Ecb,
        BankId::Bomx,
        BankId::Rba,
        BankId::Boe,
    ];

    /// Short code used on the command line and in configuration.
    pub fn code(self) -> &'static str {
        match self {
            BankId::Boc => "boc",
            BankId::Cbr => "cbr",
            BankId::Nbu => "nbu",
            BankId::Ecb => "ecb",
            BankId::Bomx => "bomx",
            BankId::Rba => "rba",
            BankId::Boe => "boe",
        }
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown bank identifier: {0}")]
pub struct UnknownBank(pub String);

impl FromStr for BankId {
    type Err = UnknownBank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boc" => Ok(BankId::Boc),
            "cbr" => Ok(BankId::Cbr),
            "nbu" => Ok(BankId::Nbu),
            "ecb" => Ok(BankId::Ecb),
            "bomx" => Ok(BankId::Bomx),
            "rba" => Ok(BankId::Rba),
            "boe" => Ok(BankId::Boe),
            _ => Err(UnknownBank(s.to_string())),
        }
    }
}

/// Constructs the adapter for `id`.
///
/// `secret` is the per-caller API token for banks that require one; banks
/// without a token requirement ignore it.
pub fn create(id: BankId, secret: &str) -> Box<dyn RateSource> {
    match id {
        BankId::Boc => Box::new(BankOfCanada::new()),
        BankId::Cbr => Box::new(CentralBankOfRussia::new()),
        BankId::Nbu => Box::new(NationalBankOfUkraine::new()),
        BankId::Ecb => Box::new(EuropeanCentralBank::new()),
        BankId::Bomx => Box::new(BankOfMexico::new(secret)),
        BankId::Rba => Box::new(ReserveBankOfAustralia::new()),
        BankId::Boe => Box::new(BankOfEngland::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(BankId::Boc as u8, 0);
        assert_eq!(BankId::Cbr as u8, 1);
        assert_eq!(BankId::Nbu as u8, 2);
        assert_eq!(BankId::Ecb as u8, 3);
        assert_eq!(BankId::Bomx as u8, 4);
        assert_eq!(BankId::Rba as u8, 5);
        assert_eq!(BankId::Boe as u8, 6);
    }

    #[test]
    fn test_codes_round_trip() {
        for id in BankId::ALL {
            assert_eq!(id.code().parse::<BankId>().unwrap(), id);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ECB".parse::<BankId>().unwrap(), BankId::Ecb);
        assert_eq!("BoMx".parse::<BankId>().unwrap(), BankId::Bomx);
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let err = "fed".parse::<BankId>().unwrap_err();
        assert_eq!(err.to_string(), "unknown bank identifier: fed");
    }
}
