//! Error types for streamscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamscribeError {
    // Audio frame errors — the offending frame is dropped, the session continues
    #[error("Failed to decode audio frame: {message}")]
    Decode { message: String },

    // Recognition backend errors — converted to an empty result, never fatal
    #[error("Recognition provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Recognition provider '{provider}' timed out after {timeout_ms}ms")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    // Translation backend errors — fall back to the untranslated text
    #[error("Translation failed for target '{target}': {message}")]
    Translation { target: String, message: String },

    // Configuration errors — the specific change is rejected, prior config stays
    #[error("Unknown recognition provider '{id}', valid providers: {valid:?}")]
    UnknownProvider { id: String, valid: Vec<String> },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // Only this class terminates a session
    #[error("Fatal session error: {message}")]
    FatalSession { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamscribeError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn translation(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Translation {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether the error is recoverable within the session. Everything except
    /// `FatalSession` is handled locally without tearing down the connection.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::FatalSession { .. })
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StreamscribeError>;
