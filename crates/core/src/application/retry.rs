// Bounded retry for metrics provider calls
use crate::application::constants::{
    DEFAULT_FETCH_BACKOFF_FACTOR, DEFAULT_FETCH_MAX_ATTEMPTS, DEFAULT_FETCH_RETRY_BASE_DELAY,
};
use crate::port::{MetricsError, MetricsProvider, VideoMetrics};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff policy
///
/// Determines how often and how long to wait between attempts:
/// - `max_attempts` counts the first call, so 1 disables retries
/// - delay = base_delay * (factor ^ attempt) * jitter, jitter in [0.9, 1.1]
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_MAX_ATTEMPTS, DEFAULT_FETCH_RETRY_BASE_DELAY)
    }
}

impl BackoffPolicy {
    /// Create a policy with the default backoff factor
    ///
    /// # Example
    /// ```text
    /// let policy = BackoffPolicy::new(3, Duration::from_secs(1));
    /// ```
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            factor: DEFAULT_FETCH_BACKOFF_FACTOR,
        }
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt + 1`.
    ///
    /// Jitter is derived from `key` so the same call always waits the same
    /// amount, while different URLs spread out.
    pub fn delay_for(&self, attempt: u32, key: &str) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let jitter_seed = key.chars().map(|c| c as u32).fold(0u32, u32::wrapping_add);
        let jitter_factor = 0.9 + f64::from(jitter_seed % 21) / 100.0; // 0.9 to 1.1

        self.base_delay
            .mul_f64(self.factor.powi(exponent) * jitter_factor)
    }
}

/// Metrics provider decorator that retries transient failures.
///
/// Permanent failures (bad URL, missing credential, undecodable payload) are
/// returned immediately.
pub struct RetryingMetricsProvider {
    inner: Arc<dyn MetricsProvider>,
    policy: BackoffPolicy,
}

impl RetryingMetricsProvider {
    pub fn new(inner: Arc<dyn MetricsProvider>, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl MetricsProvider for RetryingMetricsProvider {
    async fn fetch(
        &self,
        content_url: &str,
        credential: Option<&str>,
    ) -> Result<VideoMetrics, MetricsError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(content_url, credential).await {
                Ok(metrics) => return Ok(metrics),
                Err(e) if e.is_transient() && attempt + 1 < self.policy.max_attempts() => {
                    let delay = self.policy.delay_for(attempt, content_url);
                    warn!(
                        content_url = %content_url,
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Metrics fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(
                        content_url = %content_url,
                        attempts = attempt + 1,
                        transient = e.is_transient(),
                        "Metrics fetch giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}
