//! Shared HTTP plumbing for bank adapters.

use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("bankfx/", env!("CARGO_PKG_VERSION"));

/// Failures between the adapter and the bank's data service.
///
/// These never reach callers directly: adapters log them and fall back to
/// an unresolved quote.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a payload we cannot interpret.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Result type for adapter-internal fetch and parse steps.
pub type FetchResult<T> = Result<T, FetchError>;

pub(crate) fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client")
}

/// Send a prepared request and return the body on a success status.
pub(crate) async fn send_text(request: reqwest::RequestBuilder) -> FetchResult<String> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(response.text().await?)
}

pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> FetchResult<String> {
    send_text(client.get(url)).await
}
