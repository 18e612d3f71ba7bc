//! Shared HTTP transport.
//!
//! One `reqwest::Client` is built per process and shared by the locator and
//! the download client, so connections and the qBittorrent session cookie are
//! reused. Every request goes through [`send_with_retry`].

mod retry;

pub use retry::{is_retryable_status, send_with_retry, RetryPolicy};

use std::time::Duration;

use reqwest::Client;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("animon/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .cookie_store(true)
        .user_agent(USER_AGENT)
        .build()
}
