use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use super::config::{is_valid_language_code, SessionConfig};
use super::events::ServerEvent;
use super::stats::SessionCounters;
use crate::audio::{AudioPayload, AudioSegment, FrameDecoder, SegmentAccumulator, SegmentKind};
use crate::config::AudioConfig;
use crate::provider::ProviderRegistry;
use crate::text::{PunctuationStyle, ResultDeduplicator, TextEnricher};
use crate::translate::TranslationService;

/// Per-session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Transcribing,
}

/// Pipeline collaborators shared by every session in the process.
pub struct PipelineShared {
    pub registry: ProviderRegistry,
    pub translator: TranslationService,
    pub dedup: ResultDeduplicator,
    pub audio: AudioConfig,
}

/// Texts the pipeline compares against and updates after each emission.
/// Shared between the session and its spawned pipeline runs; the lock also
/// serializes the dedup-compare-then-emit step.
#[derive(Default)]
struct EmittedTexts {
    transcript: String,
    translation: String,
}

/// Per-connection orchestrator: owns the session state machine and wires
/// decode → accumulate → recognize → dedup → enrich → translate → emit.
///
/// One `Session` per connection, owned by the connection's event loop task.
/// Interim pipeline runs are spawned so a slow recognition call never blocks
/// newer audio frames from accumulating; the `pipeline_busy` flag keeps at
/// most one recognition call in flight per session, which also gives the
/// strict per-session emission ordering.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    accumulator: SegmentAccumulator,
    shared: Arc<PipelineShared>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    emitted: Arc<Mutex<EmittedTexts>>,
    pipeline_busy: Arc<AtomicBool>,
    /// Cleared on disconnect so in-flight results are discarded
    alive: Arc<AtomicBool>,
    pub counters: Arc<SessionCounters>,
    pub started_at: chrono::DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_id: String,
        shared: Arc<PipelineShared>,
        events_tx: mpsc::UnboundedSender<ServerEvent>,
    ) -> Self {
        let config = SessionConfig::new(session_id, shared.registry.default_id());
        let accumulator = SegmentAccumulator::new(shared.audio.clone());
        Self {
            config,
            state: SessionState::Idle,
            accumulator,
            shared,
            events_tx,
            emitted: Arc::new(Mutex::new(EmittedTexts::default())),
            pipeline_busy: Arc::new(AtomicBool::new(false)),
            alive: Arc::new(AtomicBool::new(true)),
            counters: Arc::new(SessionCounters::default()),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn emit(&self, event: ServerEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("Session {}: event receiver gone", self.config.session_id);
        }
    }

    /// Surface a non-fatal error to the client as a `transcription-error`.
    pub fn emit_error(&self, message: String) {
        self.emit(ServerEvent::TranscriptionError { error: message });
    }

    /// `start-transcription`: Idle → Transcribing. Resets the buffer, the
    /// emitted-text memory, and the dispatch timestamp.
    pub async fn start(&mut self) {
        if self.state == SessionState::Transcribing {
            warn!("Session {}: already transcribing", self.config.session_id);
            return;
        }

        info!("Session {}: transcription started", self.config.session_id);
        self.state = SessionState::Transcribing;
        self.accumulator.reset();
        {
            let mut emitted = self.emitted.lock().await;
            *emitted = EmittedTexts::default();
        }

        self.emit(ServerEvent::TranscriptionStarted {
            session_id: self.config.session_id.clone(),
        });
    }

    /// `set-languages`: each field optional; invalid codes are ignored, valid
    /// ones applied. The effective configuration is echoed back.
    pub fn set_languages(
        &mut self,
        speech: Option<String>,
        from: Option<String>,
        to: Option<String>,
    ) {
        for (field, value) in [
            ("speechLanguage", &speech),
            ("translationFrom", &from),
            ("translationTo", &to),
        ] {
            if let Some(code) = value {
                if !is_valid_language_code(code) {
                    warn!(
                        "Session {}: ignoring invalid {} '{}'",
                        self.config.session_id, field, code
                    );
                }
            }
        }

        if let Some(code) = speech.filter(|c| is_valid_language_code(c)) {
            self.config.speech_language = code;
        }
        if let Some(code) = from.filter(|c| is_valid_language_code(c)) {
            self.config.translation_from = code;
        }
        if let Some(code) = to.filter(|c| is_valid_language_code(c)) {
            self.config.translation_to = code;
        }

        self.emit(ServerEvent::LanguagesUpdated {
            speech_language: self.config.speech_language.clone(),
            translation_from: self.config.translation_from.clone(),
            translation_to: self.config.translation_to.clone(),
        });
    }

    /// `set-stt-provider`: unknown ids produce an error event listing the
    /// valid ids and leave the active provider unchanged.
    pub fn set_provider(&mut self, provider_id: String) {
        match self.shared.registry.resolve(&provider_id) {
            Ok(_) => {
                info!(
                    "Session {}: provider switched to '{}'",
                    self.config.session_id, provider_id
                );
                self.config.provider_id = provider_id.clone();
                self.emit(ServerEvent::SttProviderUpdated {
                    provider: provider_id,
                });
            }
            Err(e) => {
                warn!("Session {}: {}", self.config.session_id, e);
                self.emit(ServerEvent::SttProviderError {
                    error: e.to_string(),
                    valid_providers: self.shared.registry.valid_ids(),
                });
            }
        }
    }

    /// `set-punctuation-preferences`: unknown style names are ignored.
    pub fn set_punctuation(&mut self, enabled: Option<bool>, style: Option<String>) {
        if let Some(enabled) = enabled {
            self.config.enrichment_enabled = enabled;
        }
        if let Some(style) = style {
            if PunctuationStyle::is_known(&style) {
                self.config.punctuation_style = PunctuationStyle::parse_or_default(&style);
            } else {
                warn!(
                    "Session {}: ignoring unknown punctuation style '{}'",
                    self.config.session_id, style
                );
            }
        }

        self.emit(ServerEvent::PunctuationPreferencesUpdated {
            enabled: self.config.enrichment_enabled,
            style: serde_json::to_value(self.config.punctuation_style)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_else(|| "sentence".to_string()),
        });
    }

    /// `audio-data`: accepted only while Transcribing; otherwise dropped with
    /// a log (frames racing start/stop are expected, not errors).
    pub fn audio_frame(&mut self, payload: AudioPayload) {
        if self.state != SessionState::Transcribing {
            debug!(
                "Session {}: dropping audio frame in {:?} state",
                self.config.session_id, self.state
            );
            self.counters.frames_dropped.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let pcm = match FrameDecoder::decode(payload) {
            Ok(pcm) => pcm,
            Err(e) => {
                warn!("Session {}: {}", self.config.session_id, e);
                self.counters.frames_dropped.fetch_add(1, Ordering::SeqCst);
                return;
            }
        };

        self.counters.frames_received.fetch_add(1, Ordering::SeqCst);
        self.accumulator.append(&pcm);

        let now = Instant::now();
        if self.accumulator.should_dispatch(now)
            && !self.pipeline_busy.swap(true, Ordering::SeqCst)
        {
            let segment = self.accumulator.take_segment(SegmentKind::Interim, now);
            self.spawn_pipeline(segment);
        }
    }

    /// `stop-transcription`: flush the remaining buffer as a final result,
    /// then answer with `transcription-stopped`.
    pub async fn stop(&mut self) {
        if self.state != SessionState::Transcribing {
            debug!(
                "Session {}: stop while not transcribing",
                self.config.session_id
            );
        } else if !self.accumulator.is_empty() {
            // Bounded wait for any in-flight interim run so the final flush
            // never overlaps another recognition call for this session
            let deadline = Instant::now() + Duration::from_secs(20);
            while self.pipeline_busy.load(Ordering::SeqCst) && Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }

            let segment = self
                .accumulator
                .take_segment(SegmentKind::Final, Instant::now());
            // Awaited rather than spawned: the stopped event must follow the
            // final result.
            Self::run_pipeline(
                Arc::clone(&self.shared),
                self.config.clone(),
                segment,
                Arc::clone(&self.emitted),
                self.events_tx.clone(),
                Arc::clone(&self.alive),
                Arc::clone(&self.counters),
            )
            .await;
        }

        self.state = SessionState::Idle;
        self.accumulator.reset();
        info!("Session {}: transcription stopped", self.config.session_id);

        self.emit(ServerEvent::TranscriptionStopped {
            stats: self.counters.snapshot(false, self.started_at),
        });
    }

    /// Terminal transition: release buffers and mark in-flight work for
    /// discard. Results from calls already issued are dropped on arrival.
    pub fn disconnect(&mut self) {
        info!("Session {}: disconnected", self.config.session_id);
        self.alive.store(false, Ordering::SeqCst);
        self.state = SessionState::Idle;
        self.accumulator.reset();
    }

    fn spawn_pipeline(&self, segment: AudioSegment) {
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let emitted = Arc::clone(&self.emitted);
        let events_tx = self.events_tx.clone();
        let alive = Arc::clone(&self.alive);
        let counters = Arc::clone(&self.counters);
        let busy = Arc::clone(&self.pipeline_busy);

        tokio::spawn(async move {
            Self::run_pipeline(shared, config, segment, emitted, events_tx, alive, counters)
                .await;
            busy.store(false, Ordering::SeqCst);
        });
    }

    /// One full recognize → dedup → enrich → translate → emit run.
    ///
    /// Every failure downstream of the accumulator is absorbed here: silence
    /// and empty transcripts suppress emission, provider errors arrive as
    /// empty placeholder results, translation failures fall back to the
    /// source text. Nothing in this path ends the session.
    async fn run_pipeline(
        shared: Arc<PipelineShared>,
        config: SessionConfig,
        segment: AudioSegment,
        emitted: Arc<Mutex<EmittedTexts>>,
        events_tx: mpsc::UnboundedSender<ServerEvent>,
        alive: Arc<AtomicBool>,
        counters: Arc<SessionCounters>,
    ) {
        let kind = segment.kind;

        // Silence gate: an all-near-zero segment is not worth a backend call
        if segment.is_silent(shared.audio.silence_threshold) {
            debug!(
                "Session {}: skipping silent {}ms segment",
                config.session_id,
                segment.duration().as_millis()
            );
            return;
        }

        counters.segments_dispatched.fetch_add(1, Ordering::SeqCst);
        let result = shared
            .registry
            .transcribe_buffer(&config.provider_id, &segment, Some(&config.speech_language))
            .await;

        let transcript = result.transcript.trim().to_string();
        if transcript.is_empty() {
            // Covers both backend-reported silence and error placeholders
            if let Some(error) = &result.error {
                debug!(
                    "Session {}: suppressed failed recognition: {}",
                    config.session_id, error
                );
            }
            return;
        }

        // Hold the emitted-texts lock across compare and update so two runs
        // can never interleave their dedup decisions.
        let mut emitted_guard = emitted.lock().await;
        if shared
            .dedup
            .is_duplicate(&transcript, &emitted_guard.transcript, kind)
        {
            debug!(
                "Session {}: suppressed near-repeat transcript",
                config.session_id
            );
            return;
        }

        let (display_text, punctuated) = if config.enrichment_enabled {
            let enriched = TextEnricher::enrich(
                &transcript,
                Some(&config.speech_language),
                config.punctuation_style,
            );
            (enriched.text, enriched.applied)
        } else {
            (transcript.clone(), false)
        };

        let translation = shared
            .translator
            .translate(
                &display_text,
                &config.translation_from,
                &config.translation_to,
            )
            .await;

        if !alive.load(Ordering::SeqCst) {
            debug!(
                "Session {}: discarding result for disconnected session",
                config.session_id
            );
            return;
        }

        emitted_guard.transcript = transcript;
        emitted_guard.translation = translation.text.clone();
        drop(emitted_guard);

        counters.results_emitted.fetch_add(1, Ordering::SeqCst);
        let event = ServerEvent::TranscriptionResult {
            transcript: display_text,
            translation: translation.text,
            confidence: result.confidence,
            is_final: kind == SegmentKind::Final,
            timestamp: Utc::now(),
            speaker: None,
            punctuated,
        };
        if events_tx.send(event).is_err() {
            debug!(
                "Session {}: result dropped, receiver gone",
                config.session_id
            );
        }
    }
}
