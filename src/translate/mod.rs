//! Translation backend abstraction plus the process-wide memo cache.

pub mod cache;
pub mod http;
pub mod mock;
pub mod service;

pub use cache::TranslationCache;
pub use http::HttpTranslator;
pub use mock::MockTranslator;
pub use service::{TranslationOutcome, TranslationService};

use anyhow::Result;
use async_trait::async_trait;

/// Uniform contract over translation backends. Must be safe to call
/// concurrently from multiple sessions.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` from `source_lang` to `target_lang`. Errors are
    /// propagated here; the service converts them into untranslated
    /// fallbacks.
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str)
        -> Result<String>;
}
