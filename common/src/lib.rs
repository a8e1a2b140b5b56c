//! BankFx Common Types
//!
//! This crate contains the types shared by every bank adapter: currency
//! tables, the normalized rate quote, the error taxonomy, and date
//! formatting helpers.

pub mod currency;
pub mod date;
pub mod error;
pub mod quote;

pub use currency::*;
pub use date::*;
pub use error::*;
pub use quote::*;
