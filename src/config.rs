use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Segmenting parameters for the per-session audio buffer.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Expected input sample rate (raw PCM over the socket, no resampling)
    pub sample_rate: u32,
    /// Buffer size that triggers a recognition dispatch (bytes)
    pub segment_threshold_bytes: usize,
    /// Minimum gap between two dispatches for one session (ms)
    pub min_dispatch_interval_ms: u64,
    /// Trailing bytes kept after an interim dispatch for acoustic context
    pub interim_tail_bytes: usize,
    /// Mean |amplitude| below which a segment is treated as silence
    pub silence_threshold: i16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,             // 16kHz mono 16-bit PCM
            segment_threshold_bytes: 48000, // ~1.5s of audio
            min_dispatch_interval_ms: 1000,
            interim_tail_bytes: 6400, // ~200ms
            silence_threshold: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    /// Default provider for new sessions
    pub default_provider: String,
    /// Per-call timeout for the recognition backend (ms)
    pub call_timeout_ms: u64,
    /// Timeout for connectivity probes (ms)
    pub probe_timeout_ms: u64,
    /// OpenAI-compatible endpoint settings (whisper-http provider)
    pub whisper_http: Option<WhisperHttpConfig>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            default_provider: "mock".to_string(),
            call_timeout_ms: 15000,
            probe_timeout_ms: 5000,
            whisper_http: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperHttpConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Maximum number of memoized translations
    pub cache_capacity: usize,
    /// Seconds after which a cached translation is treated as absent
    pub cache_ttl_secs: u64,
    /// Per-call timeout for the translation backend (ms)
    pub call_timeout_ms: u64,
    /// HTTP translator endpoint; when unset the identity mock is used
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 500,
            cache_ttl_secs: 300,
            call_timeout_ms: 10000,
            endpoint: None,
            api_key: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
