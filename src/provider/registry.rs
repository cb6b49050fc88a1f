use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use super::{ProviderDescriptor, RecognitionResult, SpeechProvider};
use crate::audio::AudioSegment;
use crate::config::RecognitionConfig;
use crate::error::{Result, StreamscribeError};

/// Registry of recognition providers, looked up by id.
///
/// The provider table is fixed at startup; the default id is what new
/// sessions start with, and each session may switch its own active provider
/// afterwards. Shared across sessions behind an `Arc`, no interior
/// mutability needed beyond the providers' own.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SpeechProvider>>,
    default_id: String,
    call_timeout: Duration,
    probe_timeout: Duration,
}

impl ProviderRegistry {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            providers: HashMap::new(),
            default_id: config.default_provider.clone(),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn SpeechProvider>) {
        let id = provider.descriptor().id.clone();
        info!("Registered recognition provider '{}'", id);
        self.providers.insert(id, provider);
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    pub fn valid_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        let mut all: Vec<ProviderDescriptor> = self
            .providers
            .values()
            .map(|p| p.descriptor().clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Validate a provider id for session use. Unknown ids are rejected with
    /// the list of valid ids; prior selection stays in effect at the caller.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn SpeechProvider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| StreamscribeError::UnknownProvider {
                id: id.to_string(),
                valid: self.valid_ids(),
            })
    }

    /// Dispatch a segment to the named provider's backend.
    ///
    /// Every failure mode — unknown id, backend error, timeout — comes back
    /// as an empty zero-confidence result carrying an error marker. A session
    /// is never aborted because one recognition call went wrong.
    pub async fn transcribe_buffer(
        &self,
        provider_id: &str,
        segment: &AudioSegment,
        language_hint: Option<&str>,
    ) -> RecognitionResult {
        let provider = match self.resolve(provider_id) {
            Ok(p) => p,
            Err(e) => {
                warn!("Recognition dispatch failed: {}", e);
                return RecognitionResult::failed(e.to_string());
            }
        };

        match timeout(self.call_timeout, provider.transcribe(segment, language_hint)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Provider '{}' failed: {}", provider_id, e);
                RecognitionResult::failed(e.to_string())
            }
            Err(_) => {
                let e = StreamscribeError::ProviderTimeout {
                    provider: provider_id.to_string(),
                    timeout_ms: self.call_timeout.as_millis() as u64,
                };
                warn!("{}", e);
                RecognitionResult::failed(e.to_string())
            }
        }
    }

    /// Probe a provider's backend without touching any session state.
    pub async fn test_connection(&self, provider_id: &str) -> bool {
        let provider = match self.resolve(provider_id) {
            Ok(p) => p,
            Err(_) => return false,
        };

        match timeout(self.probe_timeout, provider.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Provider '{}' probe failed: {}", provider_id, e);
                false
            }
            Err(_) => {
                warn!(
                    "Provider '{}' probe timed out after {}ms",
                    provider_id,
                    self.probe_timeout.as_millis()
                );
                false
            }
        }
    }
}
