/*!
 * Tests for the translation providers
 */

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use chm_translator::app_config::{TranslationConfig, TranslationProvider};
use chm_translator::errors::ProviderError;
use chm_translator::providers::google::GoogleTranslate;
use chm_translator::providers::mock::{MockBehavior, MockProvider};
use chm_translator::providers::ollama::{GenerationRequest, Ollama};
use chm_translator::providers::{self, Provider};
use chm_translator::translation::RetryingProvider;

use crate::common;

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_generationRequest_withBuilderCalls_shouldSerializeAllFields() -> Result<()> {
    let request = GenerationRequest::new("llama2", "目次")
        .system("You are a translator")
        .temperature(0.5);

    let json = serde_json::to_string(&request)?;

    assert!(json.contains(r#""model":"llama2""#));
    assert!(json.contains(r#""prompt":"目次""#));
    assert!(json.contains(r#""system":"You are a translator""#));
    assert!(json.contains(r#""temperature":0.5"#));
    assert!(json.contains(r#""stream":false"#));
    Ok(())
}

#[test]
fn test_generationRequest_withoutOptions_shouldSkipThem() -> Result<()> {
    let json = serde_json::to_string(&GenerationRequest::new("llama2", "x"))?;

    assert!(!json.contains("system"));
    assert!(!json.contains("options"));
    Ok(())
}

#[tokio::test]
async fn test_google_keyless_withServerResponse_shouldJoinSentences() -> Result<()> {
    let (url, request) = common::serve_once(
        "200 OK",
        r#"[[["Contents. ","目次。",null,null,10],["Index","索引",null,null,10]],null,"ja"]"#,
    )
    .await?;
    let provider = GoogleTranslate::keyless(TIMEOUT)?.with_base_url(url);

    let translated = provider.translate("目次。索引", "ja", "en").await?;

    assert_eq!(translated, "Contents. Index");
    let request = request.await?;
    assert!(request.contains("sl=ja"));
    assert!(request.contains("tl=en"));
    assert_eq!(provider.name(), "Google Translate");
    Ok(())
}

#[tokio::test]
async fn test_google_withApiKey_shouldUseV2Response() -> Result<()> {
    let (url, request) = common::serve_once(
        "200 OK",
        r#"{"data":{"translations":[{"translatedText":"Settings"}]}}"#,
    )
    .await?;
    let provider = GoogleTranslate::with_api_key("k3y".to_string(), TIMEOUT)?.with_base_url(url);

    let translated = provider.translate("設定", "ja", "en").await?;

    assert_eq!(translated, "Settings");
    assert!(request.await?.contains("key=k3y"));
    Ok(())
}

#[tokio::test]
async fn test_google_withRateLimitStatus_shouldReturnTransientError() -> Result<()> {
    let (url, _request) = common::serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#).await?;
    let provider = GoogleTranslate::keyless(TIMEOUT)?.with_base_url(url);

    let result = provider.translate("設定", "ja", "en").await;

    match result {
        Err(e @ ProviderError::RateLimitExceeded(_)) => assert!(e.is_transient()),
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_google_withForbiddenStatus_shouldReturnAuthenticationError() -> Result<()> {
    let (url, _request) = common::serve_once("403 Forbidden", r#"{"error":"bad key"}"#).await?;
    let provider = GoogleTranslate::with_api_key("bad".to_string(), TIMEOUT)?.with_base_url(url);

    let result = provider.translate("設定", "ja", "en").await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    Ok(())
}

#[tokio::test]
async fn test_google_withOversizeText_shouldFailWithoutRetrying() -> Result<()> {
    let provider = GoogleTranslate::keyless(TIMEOUT)?.with_base_url("http://127.0.0.1:9".to_string());
    let retrying = RetryingProvider::new(Arc::new(provider), 3, Duration::from_millis(1));
    let text = "あ".repeat(GoogleTranslate::MAX_CHARS_PER_STRING + 1);

    let result = retrying.translate(&text, "ja", "en").await;

    match result {
        Err(e @ ProviderError::InvalidRequest(_)) => assert!(!e.is_transient()),
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_google_withEmptyApiKey_shouldFail() {
    let result = GoogleTranslate::with_api_key("  ".to_string(), TIMEOUT);

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
}

#[tokio::test]
async fn test_ollama_withServerResponse_shouldTrimAnswer() -> Result<()> {
    let (url, request) = common::serve_once(
        "200 OK",
        r#"{"model":"llama2","response":"  Table of contents\n","done":true}"#,
    )
    .await?;
    let provider = Ollama::new(&url, "llama2", "From {source_language} to {target_language}", 0.2, TIMEOUT)?;

    let translated = provider.translate("目次", "ja", "en").await?;

    assert_eq!(translated, "Table of contents");
    let request = request.await?;
    assert!(request.starts_with("POST /api/generate"));
    assert!(request.contains("From Japanese to English"));
    Ok(())
}

#[test]
fn test_ollama_withInvalidEndpoint_shouldFail() {
    let result = Ollama::new("http://", "llama2", "", 0.2, TIMEOUT);

    assert!(result.is_err());
}

#[test]
fn test_from_config_withEachProvider_shouldBuildIt() -> Result<()> {
    let mut config = TranslationConfig::default();
    assert_eq!(providers::from_config(&config)?.name(), "Google Translate");

    config.provider = TranslationProvider::Ollama;
    assert_eq!(providers::from_config(&config)?.name(), "Ollama");
    Ok(())
}

#[tokio::test]
async fn test_mock_intermittent_shouldFailEveryNthRequest() {
    let provider = MockProvider::intermittent(3);
    let mut failures = 0;

    for _ in 0..6 {
        if provider.translate("テスト", "ja", "en").await.is_err() {
            failures += 1;
        }
    }

    assert_eq!(failures, 2);
}

#[tokio::test]
async fn test_mock_test_connection_withUnauthorized_shouldFail() {
    assert!(MockProvider::working().test_connection().await.is_ok());
    assert!(MockProvider::new(MockBehavior::Unauthorized).test_connection().await.is_err());
}
