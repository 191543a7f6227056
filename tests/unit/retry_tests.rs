/*!
 * Tests for the retrying provider decorator
 */

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use chm_translator::errors::ProviderError;
use chm_translator::providers::Provider;
use chm_translator::providers::mock::{MockBehavior, MockProvider};
use chm_translator::translation::RetryingProvider;

fn retrying(provider: &MockProvider, retries: u32) -> RetryingProvider {
    RetryingProvider::new(Arc::new(provider.clone()), retries, Duration::from_millis(1))
}

#[tokio::test]
async fn test_translate_withTransientFailures_shouldRetryUntilSuccess() -> Result<()> {
    let provider = MockProvider::flaky(2);

    let translated = retrying(&provider, 3).translate("設定", "ja", "en").await?;

    assert_eq!(translated, "[EN] 設定");
    assert_eq!(provider.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_translate_withExhaustedRetries_shouldReturnLastError() {
    let provider = MockProvider::failing();

    let result = retrying(&provider, 2).translate("設定", "ja", "en").await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withAuthenticationError_shouldNotRetry() {
    let provider = MockProvider::new(MockBehavior::Unauthorized);

    let result = retrying(&provider, 5).translate("設定", "ja", "en").await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withClientError_shouldNotRetry() {
    let provider = MockProvider::dictionary([("はい", "Yes")]);

    let result = retrying(&provider, 5).translate("いいえ", "ja", "en").await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 400, .. })));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_name_shouldDelegateToInnerProvider() {
    let provider = MockProvider::working();

    assert_eq!(retrying(&provider, 1).name(), "Mock");
}
