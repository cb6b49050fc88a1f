use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{ProviderDescriptor, RecognitionResult, SpeechProvider};
use crate::audio::AudioSegment;
use crate::config::WhisperHttpConfig;

/// Provider backed by an OpenAI-compatible `/audio/transcriptions` endpoint.
///
/// Each segment is wrapped as a WAV upload and posted as multipart form
/// data. The endpoint returns `{"text": "..."}`; confidence is not reported
/// by this API, so a fixed optimistic value is used.
#[derive(Debug)]
pub struct WhisperHttpProvider {
    descriptor: ProviderDescriptor,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl WhisperHttpProvider {
    pub fn new(config: &WhisperHttpConfig) -> Self {
        Self {
            descriptor: ProviderDescriptor {
                id: "whisper-http".to_string(),
                name: "Whisper (HTTP)".to_string(),
                streaming: false,
                reports_confidence: false,
                reports_word_timings: false,
                max_languages: 99,
            },
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Wrap raw PCM bytes in a WAV container for upload.
    fn wav_body(segment: &AudioSegment) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: segment.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;
            for chunk in segment.pcm.chunks_exact(2) {
                writer
                    .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
                    .context("Failed to write sample to WAV")?;
            }
            writer.finalize().context("Failed to finalize WAV body")?;
        }
        Ok(cursor.into_inner())
    }
}

#[async_trait]
impl SpeechProvider for WhisperHttpProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn transcribe(
        &self,
        segment: &AudioSegment,
        language_hint: Option<&str>,
    ) -> Result<RecognitionResult> {
        let wav_data = Self::wav_body(segment)?;
        debug!(
            "Posting {}ms segment to {}",
            segment.duration().as_millis(),
            self.base_url
        );

        let part = reqwest::multipart::Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        if let Some(lang) = language_hint {
            // The API expects a bare ISO-639-1 code, not a BCP-47 tag
            let code = lang.split('-').next().unwrap_or(lang).to_string();
            form = form.text("language", code);
        }

        let url = format!("{}/audio/transcriptions", self.base_url);
        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .context("Failed to send transcription request")?;

        if !res.status().is_success() {
            let status = res.status();
            let error_text = res.text().await.unwrap_or_default();
            return Err(anyhow!("API error ({}): {}", status, error_text));
        }

        let json: serde_json::Value = res.json().await?;
        let text = json["text"].as_str().unwrap_or("").to_string();

        info!("Whisper HTTP transcription received ({} chars)", text.len());

        Ok(RecognitionResult {
            transcript: text,
            confidence: 0.9,
            is_final: false,
            language: language_hint.map(String::from),
            word_timings: Vec::new(),
            error: None,
        })
    }

    async fn probe(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .context("Probe request failed")?;

        if res.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("Probe returned status {}", res.status()))
        }
    }
}
