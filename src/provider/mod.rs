//! Speech-recognition provider abstraction.
//!
//! All recognition backends sit behind the [`SpeechProvider`] trait and are
//! looked up by id in the [`ProviderRegistry`]. The registry converts every
//! backend failure into an empty zero-confidence result so that one bad call
//! never ends a session.

pub mod mock;
pub mod registry;
pub mod whisper_http;

pub use mock::MockProvider;
pub use registry::ProviderRegistry;
pub use whisper_http::WhisperHttpProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::audio::AudioSegment;

/// Result of one recognition call.
#[derive(Debug, Clone, Default)]
pub struct RecognitionResult {
    /// Transcribed text (may be empty)
    pub transcript: String,
    /// Confidence score in [0, 1]
    pub confidence: f32,
    /// Whether the backend considers this hypothesis final
    pub is_final: bool,
    /// Detected or hinted source language
    pub language: Option<String>,
    /// Optional per-word timing, milliseconds relative to segment start
    pub word_timings: Vec<WordTiming>,
    /// Set when the backend call failed and this is a placeholder result
    pub error: Option<String>,
}

impl RecognitionResult {
    /// Placeholder emitted when a backend call fails. The pipeline treats it
    /// like a silent segment: nothing is forwarded to the client.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WordTiming {
    pub word: String,
    pub start_ms: u32,
    pub end_ms: u32,
}

/// Capability metadata for a registered provider. Immutable after startup.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    pub streaming: bool,
    pub reports_confidence: bool,
    pub reports_word_timings: bool,
    pub max_languages: usize,
}

/// Uniform contract over interchangeable recognition backends.
///
/// Implementations must be safe to call concurrently from multiple sessions;
/// any internal state is behind their own synchronization.
#[async_trait]
pub trait SpeechProvider: Send + Sync + std::fmt::Debug {
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Transcribe a single audio segment. Errors are propagated here; the
    /// registry converts them into placeholder results.
    async fn transcribe(
        &self,
        segment: &AudioSegment,
        language_hint: Option<&str>,
    ) -> Result<RecognitionResult>;

    /// Lightweight connectivity round-trip with no session side effects.
    async fn probe(&self) -> Result<()>;
}
