use async_trait::async_trait;
use log::{error, trace};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{request_error, status_error, Provider};

const DEFAULT_PORT: u16 = 11434;

/// Ollama client for interacting with Ollama API
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for translation
    model: String,
    /// System prompt template with `{source_language}` and `{target_language}` placeholders
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client
    ///
    /// Ollama typically uses HTTP/1.1, so we don't force HTTP/2.
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base_url(endpoint)?,
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature,
            client,
        })
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("Ollama", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to get response text from Ollama API: {}", e)))?;

        parse_generation(&response_text)
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error("Ollama", e))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }

    fn render_system_prompt(&self, source_language: &str, target_language: &str) -> String {
        let source = language_utils::get_language_name(source_language).unwrap_or_else(|_| source_language.to_string());
        let target = language_utils::get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());
        self.system_prompt
            .replace("{source_language}", &source)
            .replace("{target_language}", &target)
    }
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(self.render_system_prompt(source_language, target_language))
            .temperature(self.temperature);

        let response = self.generate(request).await?;
        trace!("Ollama ({}) answered: {}", response.model, response.response);

        Ok(response.response.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}

/// Accept `host`, `host:port` or a full URL; default to port 11434
pub fn normalize_base_url(endpoint: &str) -> Result<String, ProviderError> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
    .map_err(|e| ProviderError::RequestFailed(format!("Invalid Ollama endpoint '{}': {}", endpoint, e)))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ProviderError::RequestFailed(format!("Invalid host in Ollama endpoint: {}", endpoint)));
    }
    if url.port().is_none() {
        let _ = url.set_port(Some(DEFAULT_PORT));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Parse a generation response, accepting a streamed (JSON lines) body as well
fn parse_generation(response_text: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(response_text) {
        return Ok(response);
    }

    let mut model = String::new();
    let mut full_response = String::new();
    let mut parsed_any = false;
    for line in response_text.lines().filter(|line| !line.trim().is_empty()) {
        if let Ok(chunk) = serde_json::from_str::<GenerationResponse>(line) {
            model = chunk.model;
            full_response.push_str(&chunk.response);
            parsed_any = true;
        }
    }

    if parsed_any {
        return Ok(GenerationResponse {
            model,
            response: full_response,
            done: true,
        });
    }

    let preview: String = response_text.chars().take(500).collect();
    error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
    Err(ProviderError::ParseError("Ollama response contains invalid JSON".to_string()))
}
