//! BankFx CLI
//!
//! Queries a set of central banks for one currency on one date and prints
//! each bank's quote on its own line. Banks are queried concurrently; a
//! bank that cannot resolve a rate prints an unresolved quote rather than
//! failing the whole run.

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankfx_banks::{create, BankId, RateSource};
use bankfx_common::{date::format_short, RateQuote};

/// BankFx rate lookup CLI
#[derive(Parser, Debug)]
#[command(name = "bankfx")]
#[command(about = "Query central banks for foreign exchange rates")]
struct Args {
    /// ISO 4217 currency code to look up
    #[arg(short, long, default_value = "USD")]
    currency: String,

    /// Observation date, yyyy-mm-dd (defaults to today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Bank to query; repeat for several, omit for all
    #[arg(short, long)]
    bank: Vec<BankId>,

    /// Token for the Bank of Mexico SIE API
    #[arg(long, env = "BANKFX_BMX_TOKEN", default_value = "", hide_env_values = true)]
    bmx_token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let currency = args.currency.to_ascii_uppercase();
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let banks: Vec<BankId> = if args.bank.is_empty() {
        BankId::ALL.to_vec()
    } else {
        args.bank.clone()
    };

    info!(%currency, %date, banks = banks.len(), "querying banks");

    let tasks: Vec<_> = banks
        .iter()
        .map(|&id| {
            let bank = create(id, &args.bmx_token);
            let currency = currency.clone();
            tokio::spawn(async move { query_bank(bank, &currency, date).await })
        })
        .collect();

    for line in futures::future::join_all(tasks).await {
        println!("{}", line?);
    }

    Ok(())
}

async fn query_bank(bank: Box<dyn RateSource>, currency: &str, date: NaiveDate) -> String {
    match bank.rate_on(currency, date).await {
        Ok(quote) => {
            if !quote.is_resolved() {
                warn!(bank = quote.bank_name, %currency, "quote is unresolved");
            }
            format_quote(currency, &quote)
        }
        Err(err) => err.to_string(),
    }
}

fn format_quote(currency: &str, quote: &RateQuote) -> String {
    format!(
        "1 {currency} = {}\t{} on {} provided by the {}",
        quote.rate,
        quote.home_currency,
        format_short(quote.rate_date),
        quote.bank_name
    )
}
