use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::AudioPayload;

use super::stats::SessionStats;

/// Inbound events on a connection, ordered per connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    StartTranscription,
    SetLanguages {
        #[serde(rename = "speechLanguage")]
        speech_language: Option<String>,
        #[serde(rename = "translationFrom")]
        translation_from: Option<String>,
        #[serde(rename = "translationTo")]
        translation_to: Option<String>,
    },
    SetSttProvider {
        provider: String,
    },
    SetPunctuationPreferences {
        enabled: Option<bool>,
        style: Option<String>,
    },
    AudioData {
        #[serde(flatten)]
        frame: AudioFrameData,
    },
    StopTranscription,
}

/// JSON renditions of an audio frame: either an array of i16 samples or a
/// base64-encoded byte string. Binary WebSocket frames bypass this type.
#[derive(Debug, Deserialize)]
pub enum AudioFrameData {
    #[serde(rename = "samples")]
    Samples(Vec<i16>),
    #[serde(rename = "data")]
    Base64(String),
}

impl From<AudioFrameData> for AudioPayload {
    fn from(frame: AudioFrameData) -> Self {
        match frame {
            AudioFrameData::Samples(samples) => AudioPayload::Samples(samples),
            AudioFrameData::Base64(encoded) => AudioPayload::Base64(encoded),
        }
    }
}

/// Outbound events emitted to the connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    TranscriptionStarted {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    LanguagesUpdated {
        #[serde(rename = "speechLanguage")]
        speech_language: String,
        #[serde(rename = "translationFrom")]
        translation_from: String,
        #[serde(rename = "translationTo")]
        translation_to: String,
    },
    SttProviderUpdated {
        provider: String,
    },
    SttProviderError {
        error: String,
        #[serde(rename = "validProviders")]
        valid_providers: Vec<String>,
    },
    PunctuationPreferencesUpdated {
        enabled: bool,
        style: String,
    },
    TranscriptionResult {
        transcript: String,
        translation: String,
        confidence: f32,
        #[serde(rename = "isFinal")]
        is_final: bool,
        timestamp: DateTime<Utc>,
        speaker: Option<String>,
        punctuated: bool,
    },
    TranscriptionError {
        error: String,
    },
    TranscriptionStopped {
        stats: SessionStats,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_tags() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type": "start-transcription"}"#).unwrap();
        assert!(matches!(event, ClientEvent::StartTranscription));

        let event: ClientEvent = serde_json::from_str(
            r#"{"type": "set-languages", "speechLanguage": "cs-CZ", "translationTo": "en"}"#,
        )
        .unwrap();
        match event {
            ClientEvent::SetLanguages {
                speech_language,
                translation_from,
                translation_to,
            } => {
                assert_eq!(speech_language.as_deref(), Some("cs-CZ"));
                assert_eq!(translation_from, None);
                assert_eq!(translation_to.as_deref(), Some("en"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_audio_data_sample_array() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type": "audio-data", "samples": [1, -2, 3]}"#).unwrap();
        match event {
            ClientEvent::AudioData {
                frame: AudioFrameData::Samples(samples),
            } => assert_eq!(samples, vec![1, -2, 3]),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_audio_data_base64() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type": "audio-data", "data": "AAAA"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::AudioData {
                frame: AudioFrameData::Base64(_)
            }
        ));
    }

    #[test]
    fn test_server_event_kebab_tag() {
        let event = ServerEvent::SttProviderUpdated {
            provider: "mock".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stt-provider-updated");
        assert_eq!(json["provider"], "mock");
    }

    #[test]
    fn test_result_event_field_names() {
        let event = ServerEvent::TranscriptionResult {
            transcript: "hello".to_string(),
            translation: "ahoj".to_string(),
            confidence: 0.9,
            is_final: false,
            timestamp: Utc::now(),
            speaker: None,
            punctuated: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "transcription-result");
        assert_eq!(json["isFinal"], false);
        assert!(json["speaker"].is_null());
    }
}
