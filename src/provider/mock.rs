use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{ProviderDescriptor, RecognitionResult, SpeechProvider};
use crate::audio::AudioSegment;

/// Deterministic in-process provider for tests and offline runs.
///
/// Either returns a fixed transcript, replays a scripted sequence of
/// transcripts (one per call), or fails every call. Calls are counted so
/// tests can assert dispatch behavior.
#[derive(Debug)]
pub struct MockProvider {
    descriptor: ProviderDescriptor,
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
}

#[derive(Debug)]
enum Behavior {
    Fixed(String),
    Script(Vec<String>),
    Fail(String),
}

impl MockProvider {
    fn base_descriptor() -> ProviderDescriptor {
        ProviderDescriptor {
            id: "mock".to_string(),
            name: "Mock recognizer".to_string(),
            streaming: true,
            reports_confidence: true,
            reports_word_timings: false,
            max_languages: 1,
        }
    }

    /// Returns the same transcript for every call.
    pub fn returning(transcript: impl Into<String>) -> Self {
        Self {
            descriptor: Self::base_descriptor(),
            behavior: Mutex::new(Behavior::Fixed(transcript.into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replays transcripts in order; calls past the end return empty text.
    pub fn scripted(transcripts: Vec<&str>) -> Self {
        let mut script: Vec<String> = transcripts.into_iter().map(String::from).collect();
        script.reverse(); // pop() from the back
        Self {
            descriptor: Self::base_descriptor(),
            behavior: Mutex::new(Behavior::Script(script)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of transcribe calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fails every call with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            descriptor: Self::base_descriptor(),
            behavior: Mutex::new(Behavior::Fail(message.into())),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn transcribe(
        &self,
        _segment: &AudioSegment,
        language_hint: Option<&str>,
    ) -> Result<RecognitionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut behavior = self.behavior.lock().unwrap();
        let transcript = match &mut *behavior {
            Behavior::Fixed(text) => text.clone(),
            Behavior::Script(script) => script.pop().unwrap_or_default(),
            Behavior::Fail(message) => return Err(anyhow!("{}", message.clone())),
        };

        Ok(RecognitionResult {
            transcript,
            confidence: 0.95,
            is_final: false,
            language: language_hint.map(String::from),
            word_timings: Vec::new(),
            error: None,
        })
    }

    async fn probe(&self) -> Result<()> {
        let behavior = self.behavior.lock().unwrap();
        match &*behavior {
            Behavior::Fail(message) => Err(anyhow!("{}", message.clone())),
            _ => Ok(()),
        }
    }
}
