use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use crate::session::PipelineShared;

/// Shared application state for HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide pipeline collaborators (provider registry, translation
    /// cache, dedup thresholds, audio config)
    pub shared: Arc<PipelineShared>,

    /// Number of currently connected sessions
    pub active_sessions: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(shared: Arc<PipelineShared>) -> Self {
        Self {
            shared,
            active_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }
}
