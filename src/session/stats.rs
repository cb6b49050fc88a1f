use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of per-session pipeline counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether the session is currently transcribing
    pub is_transcribing: bool,

    /// When the session connected
    pub started_at: DateTime<Utc>,

    /// Audio frames accepted into the buffer
    pub frames_received: usize,

    /// Frames dropped (wrong state or decode failure)
    pub frames_dropped: usize,

    /// Segments dispatched to the recognition backend
    pub segments_dispatched: usize,

    /// Transcription results emitted to the client
    pub results_emitted: usize,
}

/// Lock-free counters updated from the event loop and pipeline tasks.
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub frames_received: AtomicUsize,
    pub frames_dropped: AtomicUsize,
    pub segments_dispatched: AtomicUsize,
    pub results_emitted: AtomicUsize,
}

impl SessionCounters {
    pub fn snapshot(&self, is_transcribing: bool, started_at: DateTime<Utc>) -> SessionStats {
        SessionStats {
            is_transcribing,
            started_at,
            frames_received: self.frames_received.load(Ordering::SeqCst),
            frames_dropped: self.frames_dropped.load(Ordering::SeqCst),
            segments_dispatched: self.segments_dispatched.load(Ordering::SeqCst),
            results_emitted: self.results_emitted.load(Ordering::SeqCst),
        }
    }
}
