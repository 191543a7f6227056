/*!
 * Translation of archive text.
 *
 * - `client`: defensive wrapper around a provider (timeout, pacing, cache)
 * - `retry`: provider decorator with exponential backoff
 * - `cache`: in-memory cache of successful translations
 * - `page`: rewrites the text nodes of a page
 * - `navigation`: rewrites the labels of contents and index files
 */

use log::debug;

use crate::errors::TranslationError;

pub use self::cache::TranslationCache;
pub use self::client::TranslationClient;
pub use self::navigation::NavigationTranslator;
pub use self::page::{PageReport, PageTranslator};
pub use self::retry::RetryingProvider;

pub mod cache;
pub mod client;
pub mod navigation;
pub mod page;
pub mod retry;

/// One original string paired with the text that replaces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub original: String,
    /// Never empty for a non-empty original; equals `original` after a failure
    pub translated: String,
    pub source_language: String,
    pub target_language: String,
    /// Whether the translation failed and the original was kept
    pub fell_back: bool,
}

impl TranslationUnit {
    /// Resolve a translation result, degrading any failure to the original text
    pub fn resolve(
        original: &str,
        result: Result<String, TranslationError>,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        let (translated, fell_back) = match result {
            Ok(translated) => (translated, false),
            Err(e) => {
                debug!("Keeping original text after failure: {}", e);
                (original.to_string(), true)
            }
        };

        Self {
            original: original.to_string(),
            translated,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            fell_back,
        }
    }
}
