/*!
 * Defensive translation client.
 *
 * Every string on its way to a provider passes through `TranslationClient`. It spaces
 * requests, enforces a deadline, consults the cache and turns anything that goes
 * wrong into a `TranslationError`. It never decides what to do about a failure;
 * callers resolve failures through `TranslationUnit::resolve`.
 */

use log::{error, trace};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::translation::cache::{truncate_text, TranslationCache};
use crate::translation::TranslationUnit;

/// Request and failure counters of a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub requests: usize,
    pub failures: usize,
}

/// Translation client wrapping a provider
#[derive(Debug)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    timeout: Option<Duration>,
    request_delay: Duration,
    /// Start time reserved for the most recent request
    last_request: Mutex<Option<Instant>>,
    cache: TranslationCache,
    requests: AtomicUsize,
    failures: AtomicUsize,
}

impl TranslationClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            timeout: None,
            request_delay: Duration::ZERO,
            last_request: Mutex::new(None),
            cache: TranslationCache::disabled(),
            requests: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Give up on a request after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep at least `delay` between the start of consecutive requests
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Translate one string. An empty answer from the provider counts as a failure.
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if let Some(cached) = self.cache.get(text, source_language, target_language) {
            return Ok(cached);
        }

        let result = self.request(text, source_language, target_language).await;
        match &result {
            Ok(translated) => {
                trace!("Translated '{}' -> '{}'", truncate_text(text, 60), truncate_text(translated, 60));
                self.cache.store(text, source_language, target_language, translated);
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!("Translation failed for text '{}': {}", truncate_text(text, 200), e);
            }
        }

        result
    }

    /// Translate one string and resolve the outcome into a unit, falling back to the original
    pub async fn translate_unit(&self, text: &str, source_language: &str, target_language: &str) -> TranslationUnit {
        let result = self.translate(text, source_language, target_language).await;
        TranslationUnit::resolve(text, result, source_language, target_language)
    }

    async fn request(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        self.wait_for_slot().await;
        self.requests.fetch_add(1, Ordering::Relaxed);

        let call = self.provider.translate(text, source_language, target_language);
        let translated = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| TranslationError::Timeout(timeout.as_millis() as u64))??,
            None => call.await?,
        };

        if translated.trim().is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }

    /// Reserve the next request slot and sleep until it starts
    async fn wait_for_slot(&self) {
        if self.request_delay.is_zero() {
            return;
        }

        let wait = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let start = match *last {
                Some(previous) => (previous + self.request_delay).max(now),
                None => now,
            };
            *last = Some(start);
            start - now
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
