//! Bounded retry around backend calls

use std::sync::Arc;
use std::time::Duration;

use openapi_client::models::ErrorResponse;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ConsoleError;
use crate::http::client::{RawResponse, Transport};
use crate::utils::{calc_exp_backoff, calc_jitter, CooldownOptions};

/// Delay strategy between attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same pause before every retry
    Fixed(Duration),

    /// `base * 2^attempt` plus uniform jitter in `[0, max_jitter)`, attempt 0-based
    Exponential { base: Duration, max_jitter: Duration },
}

impl Backoff {
    /// Delay to wait after the failed attempt with index `attempt`
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, max_jitter } => {
                let options = CooldownOptions {
                    base_delay: *base,
                    ..Default::default()
                };
                calc_exp_backoff(&options, attempt) + calc_jitter(*max_jitter)
            }
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_secs(1)),
        }
    }
}

/// Backend caller with bounded retries
///
/// Transport failures and non-2xx statuses are retried. A 2xx response is
/// returned as is, even when it reports `success: false`.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// POST a serializable body with the configured attempt limit
    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, ConsoleError> {
        let body = serde_json::to_value(body)?;
        self.fetch_with_retry(path, &body, self.policy.max_attempts).await
    }

    /// POST `body` to `path`, trying at most `max_attempts` times
    ///
    /// Returns the decoded JSON body of the first 2xx response, `None` if it had
    /// none. After the last attempt the error of that attempt is returned.
    pub async fn fetch_with_retry(
        &self,
        path: &str,
        body: &Value,
        max_attempts: u32,
    ) -> Result<Option<Value>, ConsoleError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = match self.transport.post_json(path, body).await {
                Ok(response) => check_status(response),
                Err(e) => Err(e),
            };

            match result {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = self.policy.backoff.delay(attempt);
                    warn!(
                        "POST {} failed (attempt {}/{}): {}; retrying in {:?}",
                        path,
                        attempt + 1,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("POST {} giving up after {} attempt(s)", path, attempt + 1);
                    return Err(e);
                }
            }
        }
    }
}

fn check_status(response: RawResponse) -> Result<Option<Value>, ConsoleError> {
    if response.is_success() {
        return Ok(response.body);
    }

    let message = response
        .body
        .and_then(|body| serde_json::from_value::<ErrorResponse>(body).ok())
        .and_then(|body| body.error)
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", response.status));

    Err(ConsoleError::Http {
        status: response.status,
        message,
    })
}
