// End-to-end tests for the per-session orchestrator: state machine
// transitions, dispatch behavior, silence suppression, and the ordered
// interim/final emission contract.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use streamscribe::audio::AudioPayload;
use streamscribe::config::{AudioConfig, RecognitionConfig, TranslationConfig};
use streamscribe::provider::{MockProvider, ProviderRegistry};
use streamscribe::session::{PipelineShared, ServerEvent, Session, SessionState};
use streamscribe::text::{DedupConfig, ResultDeduplicator};
use streamscribe::translate::{MockTranslator, TranslationService};

fn audio_config(threshold_bytes: usize) -> AudioConfig {
    AudioConfig {
        sample_rate: 16000,
        segment_threshold_bytes: threshold_bytes,
        min_dispatch_interval_ms: 0,
        interim_tail_bytes: 320,
        silence_threshold: 120,
    }
}

fn build_session(
    provider: Arc<MockProvider>,
    audio: AudioConfig,
) -> (Session, UnboundedReceiver<ServerEvent>) {
    let mut registry = ProviderRegistry::new(&RecognitionConfig::default());
    registry.register(provider);

    let shared = Arc::new(PipelineShared {
        registry,
        translator: TranslationService::new(
            Arc::new(MockTranslator::new()),
            &TranslationConfig::default(),
        ),
        dedup: ResultDeduplicator::new(DedupConfig::default()),
        audio,
    });

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let session = Session::new("session-test".to_string(), shared, events_tx);
    (session, events_rx)
}

fn silent_frame(bytes: usize) -> AudioPayload {
    AudioPayload::Bytes(vec![0u8; bytes])
}

fn voiced_frame(samples: usize) -> AudioPayload {
    AudioPayload::Samples(vec![3000i16; samples])
}

async fn recv_event(rx: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn assert_no_event(rx: &mut UnboundedReceiver<ServerEvent>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(
        rx.try_recv().is_err(),
        "expected no event, but one was emitted"
    );
}

#[tokio::test]
async fn test_audio_before_start_is_dropped_noop() {
    let provider = Arc::new(MockProvider::returning("should not appear"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.audio_frame(voiced_frame(1600));
    session.audio_frame(voiced_frame(1600));

    assert_eq!(session.state(), SessionState::Idle);
    assert_no_event(&mut rx).await;
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_start_emits_started_and_transitions() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, mut rx) = build_session(provider, audio_config(3200));

    session.start().await;
    assert_eq!(session.state(), SessionState::Transcribing);

    match recv_event(&mut rx).await {
        ServerEvent::TranscriptionStarted { session_id } => {
            assert_eq!(session_id, "session-test")
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_silent_segment_emits_nothing_and_skips_backend() {
    let provider = Arc::new(MockProvider::returning("phantom speech"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.start().await;
    recv_event(&mut rx).await; // transcription-started

    // One full segment of near-zero audio: dispatch fires, silence gate holds
    session.audio_frame(silent_frame(3200));

    assert_no_event(&mut rx).await;
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_silence_then_voice_single_recognition_call() {
    let provider = Arc::new(MockProvider::returning("dobrý den všichni"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.start().await;
    recv_event(&mut rx).await;

    // Two silent frames reach the threshold; the resulting segment is
    // silence-gated without a backend call
    session.audio_frame(silent_frame(1600));
    session.audio_frame(silent_frame(1600));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.call_count(), 0);

    // A voiced frame pushes a mixed segment over the threshold
    session.audio_frame(voiced_frame(1600));

    match recv_event(&mut rx).await {
        ServerEvent::TranscriptionResult {
            transcript,
            translation,
            is_final,
            punctuated,
            ..
        } => {
            assert!(!is_final);
            assert!(punctuated);
            assert_eq!(transcript, "Dobrý den všichni.");
            // Default config translates en -> en, which is the identity
            assert_eq!(translation, transcript);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert_eq!(provider.call_count(), 1);
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn test_provider_error_suppresses_result() {
    let provider = Arc::new(MockProvider::failing("recognition backend down"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.start().await;
    recv_event(&mut rx).await;

    session.audio_frame(voiced_frame(1600));

    // The backend was tried once, but the empty placeholder never reaches
    // the client
    assert_no_event(&mut rx).await;
    assert_eq!(provider.call_count(), 1);
    assert_eq!(session.state(), SessionState::Transcribing);
}

#[tokio::test]
async fn test_stop_flushes_pending_buffer_as_final() {
    let provider = Arc::new(MockProvider::returning("poslední věta"));
    // High threshold: nothing dispatches until the stop flush
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(48000));

    session.start().await;
    recv_event(&mut rx).await;

    session.audio_frame(voiced_frame(1600));
    session.stop().await;

    match recv_event(&mut rx).await {
        ServerEvent::TranscriptionResult { is_final, .. } => assert!(is_final),
        other => panic!("unexpected event: {other:?}"),
    }
    match recv_event(&mut rx).await {
        ServerEvent::TranscriptionStopped { stats } => {
            assert!(!stats.is_transcribing);
            assert_eq!(stats.results_emitted, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    assert_eq!(provider.call_count(), 1);
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stop_with_empty_buffer_just_stops() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(48000));

    session.start().await;
    recv_event(&mut rx).await;
    session.stop().await;

    assert!(matches!(
        recv_event(&mut rx).await,
        ServerEvent::TranscriptionStopped { .. }
    ));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_audio_after_stop_is_dropped() {
    let provider = Arc::new(MockProvider::returning("late audio"));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.start().await;
    recv_event(&mut rx).await;
    session.stop().await;
    recv_event(&mut rx).await; // transcription-stopped

    session.audio_frame(voiced_frame(1600));
    assert_no_event(&mut rx).await;
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_provider_rejected_with_valid_list() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, mut rx) = build_session(provider, audio_config(3200));

    session.set_provider("unknown-id".to_string());

    match recv_event(&mut rx).await {
        ServerEvent::SttProviderError {
            error,
            valid_providers,
        } => {
            assert!(error.contains("unknown-id"));
            assert_eq!(valid_providers, vec!["mock".to_string()]);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // Active provider unchanged
    assert_eq!(session.config().provider_id, "mock");
}

#[tokio::test]
async fn test_valid_provider_switch_acknowledged() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, mut rx) = build_session(provider, audio_config(3200));

    session.set_provider("mock".to_string());
    assert!(matches!(
        recv_event(&mut rx).await,
        ServerEvent::SttProviderUpdated { .. }
    ));
}

#[tokio::test]
async fn test_set_languages_ignores_invalid_echoes_effective() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, mut rx) = build_session(provider, audio_config(3200));

    session.set_languages(
        Some("cs-CZ".to_string()),
        Some("not a code".to_string()),
        Some("de".to_string()),
    );

    match recv_event(&mut rx).await {
        ServerEvent::LanguagesUpdated {
            speech_language,
            translation_from,
            translation_to,
        } => {
            assert_eq!(speech_language, "cs-CZ");
            // Invalid source code ignored, default kept
            assert_eq!(translation_from, "en");
            assert_eq!(translation_to, "de");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_hypotheses_suppressed_across_segments() {
    // Backend repeats a barely-grown hypothesis; only the first emission
    // goes out.
    let provider = Arc::new(MockProvider::scripted(vec![
        "the same sentence here",
        "the same sentence here.",
    ]));
    let (mut session, mut rx) = build_session(Arc::clone(&provider), audio_config(3200));

    session.start().await;
    recv_event(&mut rx).await;

    session.audio_frame(voiced_frame(1600));
    match recv_event(&mut rx).await {
        ServerEvent::TranscriptionResult { is_final, .. } => assert!(!is_final),
        other => panic!("unexpected event: {other:?}"),
    }

    // Let the first pipeline run fully release its in-flight slot
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.audio_frame(voiced_frame(1600));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.call_count(), 2);
    assert_no_event(&mut rx).await;
}

#[tokio::test]
async fn test_disconnect_discards_everything() {
    let provider = Arc::new(MockProvider::returning("x"));
    let (mut session, _rx) = build_session(provider, audio_config(3200));

    session.start().await;
    session.audio_frame(voiced_frame(800));
    session.disconnect();

    assert_eq!(session.state(), SessionState::Idle);
}
