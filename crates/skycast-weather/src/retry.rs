//! Retry with exponential backoff for weather API requests.
//!
//! Retried:
//! - Timeouts and connection failures
//! - 5xx server errors, 408 and 429
//!
//! Not retried:
//! - Other 4xx responses (unknown city, bad API key, ...)

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt)
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_retries(2)
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::with_retries(0)
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    match error.status() {
        Some(status) => classify_status(status),
        None => RetryDecision::NoRetry,
    }
}

pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Send a request, rebuilding it for each attempt.
///
/// The last attempt's outcome is returned as-is, so a persistent 503 comes
/// back as a `Response` for the caller to classify.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    label: &str,
    build: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let last_attempt = attempt >= policy.max_retries;
        let outcome = build().send().await;

        let decision = match &outcome {
            Ok(response) => classify_status(response.status()),
            Err(e) => classify_error(e),
        };

        if last_attempt || decision == RetryDecision::NoRetry {
            if attempt > 0 && outcome.is_ok() {
                tracing::debug!("{} finished after {} retries", label, attempt);
            }
            return outcome;
        }

        match &outcome {
            Ok(response) => tracing::warn!(
                "{} returned {}, attempt {} of {}",
                label,
                response.status(),
                attempt + 1,
                policy.max_retries + 1
            ),
            Err(e) => tracing::warn!(
                "{} failed on attempt {} of {}: {}",
                label,
                attempt + 1,
                policy.max_retries + 1,
                e
            ),
        }

        tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
        attempt += 1;
    }
}
