/*!
 * Google Translate provider.
 *
 * Two endpoints are supported:
 * - the keyless web endpoint (`translate_a/single`), which needs no account
 * - the official v2 API, used when an API key is configured
 */

use async_trait::async_trait;
use log::trace;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{request_error, status_error, Provider};

const WEB_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const API_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Translate client
#[derive(Clone)]
pub struct GoogleTranslate {
    client: reqwest::Client,
    /// API key for the v2 endpoint; `None` selects the web endpoint
    api_key: Option<String>,
    base_url: String,
}

impl GoogleTranslate {
    /// Maximum characters per string accepted by the service
    pub const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Client for the keyless web endpoint
    pub fn keyless(timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: None,
            base_url: WEB_ENDPOINT.to_string(),
        })
    }

    /// Client for the official v2 API
    pub fn with_api_key(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::AuthenticationError("API key cannot be empty".to_string()));
        }

        Ok(Self {
            client: build_client(timeout)?,
            api_key: Some(api_key),
            base_url: API_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| request_error("Google Translate", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Google response: {}", e)))
    }

    async fn translate_web(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let request = self
            .client
            .post(&self.base_url)
            .query(&[("client", "gtx"), ("sl", source), ("tl", target), ("dt", "t")])
            .form(&[("q", text)]);

        parse_web_response(&self.send(request).await?)
    }

    async fn translate_api(
        &self,
        api_key: &str,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let body = json!({
            "q": [text],
            "source": source,
            "target": target,
            "format": "text"
        });
        let request = self
            .client
            .post(&self.base_url)
            .query(&[("key", api_key)])
            .json(&body);

        parse_api_response(&self.send(request).await?)
    }
}

impl std::fmt::Debug for GoogleTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslate")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(ProviderError::InvalidRequest(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        trace!("Google translate {} -> {}: {}", source_language, target_language, text);
        match &self.api_key {
            Some(api_key) => self.translate_api(api_key, text, source_language, target_language).await,
            None => self.translate_web(text, source_language, target_language).await,
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.translate("test", "en", "fr").await.map(|_| ())
    }

    fn name(&self) -> &str {
        "Google Translate"
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))
}

/// The web endpoint answers with nested arrays; the first element holds one
/// `[translated, original, ...]` entry per sentence.
fn parse_web_response(value: &Value) -> Result<String, ProviderError> {
    let sentences = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::ParseError("Invalid response: missing sentence array".to_string()))?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect())
}

fn parse_api_response(value: &Value) -> Result<String, ProviderError> {
    value["data"]["translations"]
        .get(0)
        .and_then(|t| t["translatedText"].as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::ParseError("Invalid API response: missing 'data.translations' entry".to_string())
        })
}
