use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::warn;

use super::{TranslationCache, Translator};
use crate::config::TranslationConfig;

/// Result of one translation lookup.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub text: String,
    pub from_cache: bool,
    pub failed: bool,
}

/// Cache-fronted translation entry point shared by all sessions.
///
/// Cache hits within the TTL short-circuit the backend; misses call it with
/// a bounded timeout. A backend failure falls back to the untranslated text
/// with `failed=true` so the pipeline always has something to display.
pub struct TranslationService {
    backend: Arc<dyn Translator>,
    cache: Mutex<TranslationCache>,
    call_timeout: Duration,
}

impl TranslationService {
    pub fn new(backend: Arc<dyn Translator>, config: &TranslationConfig) -> Self {
        Self {
            backend,
            cache: Mutex::new(TranslationCache::new(
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_secs),
            )),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
        }
    }

    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationOutcome {
        // Identity translation needs no backend at all
        if text.trim().is_empty() || source_lang == target_lang {
            return TranslationOutcome {
                text: text.to_string(),
                from_cache: false,
                failed: false,
            };
        }

        {
            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get(text, target_lang, Instant::now()) {
                return TranslationOutcome {
                    text: cached,
                    from_cache: true,
                    failed: false,
                };
            }
        }

        match timeout(
            self.call_timeout,
            self.backend.translate(text, source_lang, target_lang),
        )
        .await
        {
            Ok(Ok(translated)) => {
                let mut cache = self.cache.lock().await;
                cache.insert(text, target_lang, translated.clone(), Instant::now());
                TranslationOutcome {
                    text: translated,
                    from_cache: false,
                    failed: false,
                }
            }
            Ok(Err(e)) => {
                warn!(
                    "Translator '{}' failed ({} -> {}): {}",
                    self.backend.name(),
                    source_lang,
                    target_lang,
                    e
                );
                TranslationOutcome {
                    text: text.to_string(),
                    from_cache: false,
                    failed: true,
                }
            }
            Err(_) => {
                warn!(
                    "Translator '{}' timed out after {}ms",
                    self.backend.name(),
                    self.call_timeout.as_millis()
                );
                TranslationOutcome {
                    text: text.to_string(),
                    from_cache: false,
                    failed: true,
                }
            }
        }
    }
}
