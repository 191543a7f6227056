/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged copy of the text
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::dictionary(..)` - Translates known strings, fails on the rest
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[<TARGET>] <text>`
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a server error
    Failing,
    /// Fails with a transient error for the first N requests, then works
    Flaky { failures: usize },
    /// Fails with a non-transient error
    Unauthorized,
    /// Returns an empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Known translations; when set, unknown strings fail
    dictionary: Option<Arc<HashMap<String, String>>>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every text the provider was asked to translate, in order
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            dictionary: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a provider that fails `failures` times with a transient error, then works
    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::Flaky { failures })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a provider that only knows the given translations
    pub fn dictionary<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            dictionary: Some(Arc::new(map)),
            ..Self::working()
        }
    }

    /// Texts received so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn answer(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        match &self.dictionary {
            Some(dictionary) => dictionary
                .get(text)
                .cloned()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 400,
                    message: format!("No translation for '{}'", text),
                }),
            None => Ok(format!("[{}] {}", target_language.to_uppercase(), text)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(text.to_string());

        match self.behavior {
            MockBehavior::Working => self.answer(text, target_language),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated intermittent failure (request {})", count + 1),
                    })
                } else {
                    self.answer(text, target_language)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Flaky { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError("Simulated connection reset".to_string()))
                } else {
                    self.answer(text, target_language)
                }
            }

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError("Simulated invalid key".to_string())),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                self.answer(text, target_language)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing | MockBehavior::Unauthorized => {
                Err(ProviderError::ConnectionError("Mock provider configured to fail".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
