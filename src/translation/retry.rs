use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

// @module: Retry with exponential backoff around any provider

/// Provider decorator that retries transient failures.
///
/// Waits `backoff_base`, then twice that, and so on between attempts. Errors that
/// cannot succeed on a second try (authentication, malformed responses, 4xx) are
/// returned immediately.
#[derive(Debug, Clone)]
pub struct RetryingProvider {
    inner: Arc<dyn Provider>,
    max_retries: u32,
    backoff_base: Duration,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn Provider>, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff_base,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(16))
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let mut attempt = 0;

        loop {
            match self.inner.translate(text, source_language, target_language).await {
                Ok(translated) => return Ok(translated),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} request failed ({}), retrying in {} ms - attempt {}/{}",
                        self.inner.name(),
                        e,
                        delay.as_millis(),
                        attempt + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.inner.test_connection().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
