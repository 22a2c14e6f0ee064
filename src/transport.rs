//! HTTP transport with exponential backoff retry logic.
//!
//! Every source talks to the network through the [`Fetch`] trait, so the
//! retry policy, the identity header and the timeout are decided in one place.
//!
//! # Architecture
//!
//! - [`Fetch`]: Core trait defining an async GET returning a [`Payload`]
//! - [`HttpFetcher`]: `reqwest`-backed implementation with the fixed headers
//! - [`RetryFetch`]: Decorator that adds retry logic to any `Fetch` implementation
//! - [`retry_with_backoff`]: The retry loop itself, usable around any fallible future
//!
//! # Retry Strategy
//!
//! - 3 attempts in total
//! - Exponential backoff starting at 2 seconds, doubling per attempt
//! - Delay (including jitter) capped at 10 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::error::FetchError;
use rand::{Rng, rng};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Browser identity sent with every request; several sources reject unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

/// Connect and whole-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A response body, parsed as JSON when possible.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body parsed as JSON.
    Json(Value),
    /// The raw body, when it was not valid JSON.
    Text(String),
}

impl Payload {
    /// Classify a response body.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    }
}

/// Trait for issuing a GET request.
///
/// Sources are generic over this trait, which lets the retry decorator and
/// test doubles slot in without touching extraction code.
pub trait Fetch {
    /// Fetch `url` with the given query parameters.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to request
    /// * `params` - Query pairs appended to the URL
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Payload, FetchError>;
}

/// Plain `reqwest` transport: one attempt per call.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the fixed user agent and timeouts.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Payload, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(request_error)?;
        debug!(bytes = body.len(), "Fetched body");
        Ok(Payload::from_body(body))
    }
}

/// Attempt budget and delay schedule for [`retry_with_backoff`].
///
/// The delay before attempt `n + 1` follows:
/// ```text
/// delay = min(base_delay * 2^(n-1) + random_jitter(0..=max_jitter), max_delay)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Upper bound for the random jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay to wait after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(31) as u32;
        let backoff = self.base_delay.saturating_mul(1u32 << shift);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng().random_range(0..=jitter_ms))
        };
        backoff.saturating_add(jitter).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` is used up.
///
/// The closure receives the 1-based attempt number. The last error is
/// returned unchanged when every attempt fails.
pub async fn retry_with_backoff<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let total_t0 = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        let attempt_t0 = Instant::now();
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                let attempt_dt = attempt_t0.elapsed();
                let total_dt = total_t0.elapsed();

                if attempt >= max_attempts {
                    error!(
                        attempt,
                        max = max_attempts,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        error = %e,
                        "Exhausted retries"
                    );
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max = max_attempts,
                    elapsed_ms_attempt = attempt_dt.as_millis(),
                    ?delay,
                    error = %e,
                    "Attempt failed; backing off"
                );
                sleep(delay).await;
            }
        }
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Fetch`] implementation.
pub struct RetryFetch<T> {
    /// The underlying transport to wrap.
    inner: T,
    /// Attempt budget and delay schedule.
    policy: RetryPolicy,
}

impl<T> RetryFetch<T>
where
    T: Fetch,
{
    /// Create a new retry wrapper around an existing [`Fetch`] implementation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use trending_digest::transport::{HttpFetcher, RetryFetch, RetryPolicy};
    ///
    /// let fetcher = RetryFetch::new(HttpFetcher::new().unwrap(), RetryPolicy::default());
    /// ```
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> Fetch for RetryFetch<T>
where
    T: Fetch,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Payload, FetchError> {
        retry_with_backoff(&self.policy, |_| self.inner.get(url, params)).await
    }
}
