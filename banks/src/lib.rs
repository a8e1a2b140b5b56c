//! Bank Adapters
//!
//! One module per central bank, each wrapping that bank's public data
//! service and normalizing its observations into
//! [`bankfx_common::RateQuote`]. The [`registry`] module maps stable bank
//! identifiers to boxed [`RateSource`] implementations.

pub mod fallback;
pub mod fetch;
pub mod registry;
pub mod source;

pub mod boc;
pub mod boe;
pub mod bomx;
pub mod cbr;
pub mod ecb;
pub mod nbu;
pub mod rba;

pub use registry::{create, BankId};
pub use source::RateSource;
