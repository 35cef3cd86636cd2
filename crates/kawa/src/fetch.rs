use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use url::Url;

use crate::{
    error::{KawaError, KawaResult},
    segment::MediaSegment,
    SegmentSource,
};

/// Retry behavior of a single fetch: which failures are worth retrying and
/// how long to back off between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub transient_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(200),
            transient_statuses: vec![
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// A transient failure is a retryable server status, or a transport error
    /// where the connection failed before a usable response arrived.
    fn is_transient(&self, error: &KawaError) -> bool {
        match error {
            KawaError::HttpError(status) => self.transient_statuses.contains(status),
            KawaError::RequestError(_) => true,
            _ => false,
        }
    }

    /// Delay before retry number `attempt + 1`, doubling per attempt.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Performs one HTTP GET with bounded automatic retry.
///
/// Stateless across calls: the attempt counter starts fresh for every fetch,
/// so segments of the same stream retry independently.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub async fn fetch(&self, url: &Url) -> KawaResult<Bytes> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(error)
                    if attempt < self.policy.max_retries && self.policy.is_transient(&error) =>
                {
                    let delay = self.policy.delay_for_attempt(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Fetching {url} failed, retrying ({attempt}/{}) in {delay:?}. {error}",
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    tracing::error!("Fetching {url} failed: {error}");
                    return Err(error);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> KawaResult<Bytes> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(KawaError::HttpError(status));
        }
        Ok(response.bytes().await?)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), RetryPolicy::default())
    }
}

impl SegmentSource for Fetcher {
    fn fetch_segment(
        &self,
        segment: &MediaSegment,
    ) -> impl std::future::Future<Output = KawaResult<Bytes>> + Send {
        let url = segment.url.clone();
        async move { self.fetch(&url).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(800));
    }

    #[test]
    fn test_transient_classification() {
        let policy = RetryPolicy::default();
        assert!(policy.is_transient(&KawaError::HttpError(StatusCode::SERVICE_UNAVAILABLE)));
        assert!(policy.is_transient(&KawaError::HttpError(StatusCode::BAD_GATEWAY)));
        assert!(!policy.is_transient(&KawaError::HttpError(StatusCode::NOT_FOUND)));
        assert!(!policy.is_transient(&KawaError::HttpError(StatusCode::FORBIDDEN)));
    }
}
