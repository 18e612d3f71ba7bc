//! Transport-level retry with exponential backoff.
//!
//! Absorbs short network blips (connection errors, timeouts, 429 and common
//! 5xx statuses) before they reach the monitor loop. This retry is bounded;
//! the monitor's own retry is not.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

/// Retry configuration for a single request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that sends each request exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Statuses worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Send a request, retrying transient failures according to `policy`.
///
/// When retries are exhausted on a retryable status the last response is
/// returned as-is so callers can apply their own status handling. Requests
/// whose body cannot be cloned are sent once.
pub async fn send_with_retry(
    policy: &RetryPolicy,
    request: RequestBuilder,
) -> Result<Response, reqwest::Error> {
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        let Some(this_try) = request.try_clone() else {
            return request.send().await;
        };

        match this_try.send().await {
            Ok(response)
                if is_retryable_status(response.status()) && attempt < policy.max_retries =>
            {
                warn!(
                    url = %response.url(),
                    status = response.status().as_u16(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Transient HTTP status, retrying"
                );
            }
            Ok(response) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "Request succeeded after retry");
                }
                return Ok(response);
            }
            Err(e) if is_retryable_error(&e) && attempt < policy.max_retries => {
                warn!(
                    error = %e,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Request failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }

        attempt += 1;
        tokio::time::sleep(delay).await;
        delay = delay.mul_f64(policy.backoff_multiplier);
    }
}
