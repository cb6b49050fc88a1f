pub mod audio;
pub mod config;
pub mod error;
pub mod provider;
pub mod server;
pub mod session;
pub mod text;
pub mod translate;

pub use audio::{AudioPayload, AudioSegment, FrameDecoder, SegmentAccumulator, SegmentKind};
pub use config::Config;
pub use error::{Result, StreamscribeError};
pub use provider::{
    MockProvider, ProviderDescriptor, ProviderRegistry, RecognitionResult, SpeechProvider,
    WhisperHttpProvider,
};
pub use server::{create_router, AppState};
pub use session::{
    ClientEvent, PipelineShared, ServerEvent, Session, SessionConfig, SessionState, SessionStats,
};
pub use text::{DedupConfig, PunctuationStyle, ResultDeduplicator, TextEnricher};
pub use translate::{
    HttpTranslator, MockTranslator, TranslationCache, TranslationService, Translator,
};
