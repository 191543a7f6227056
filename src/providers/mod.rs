/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported services:
 * - Google: Google Translate (keyless web endpoint, or the v2 API with a key)
 * - Ollama: Local LLM server
 * - Mock: Scripted provider for tests
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably and wrapped by decorators such as
/// `translation::retry::RetryingProvider`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate a single string
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - ISO 639-1 code of the text
    /// * `target_language` - ISO 639-1 code to translate into
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Display name used in logs
    fn name(&self) -> &str;
}

/// Map a transport-level reqwest failure to a provider error
pub(crate) fn request_error(service: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", service, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", service, error))
    }
}

/// Map a non-success HTTP status to a provider error
pub(crate) fn status_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

/// Build the provider selected in the configuration
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn Provider>> {
    let timeout = Duration::from_secs(config.get_timeout_secs());

    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::Google => {
            let api_key = config.get_api_key();
            let provider = if api_key.is_empty() {
                google::GoogleTranslate::keyless(timeout)
            } else {
                google::GoogleTranslate::with_api_key(api_key, timeout)
            };
            Arc::new(provider.map_err(|e| anyhow!("Failed to create Google Translate client: {}", e))?)
        }
        TranslationProvider::Ollama => Arc::new(
            ollama::Ollama::new(
                &config.get_endpoint(),
                config.get_model(),
                config.common.system_prompt.clone(),
                config.common.temperature,
                timeout,
            )
            .map_err(|e| anyhow!("Failed to create Ollama client: {}", e))?,
        ),
    };

    Ok(provider)
}

pub mod google;
pub mod mock;
pub mod ollama;
