//! Per-connection session orchestration
//!
//! This module provides the `Session` state machine that manages:
//! - Inbound event handling (start/config/audio/stop/disconnect)
//! - Audio buffering and segment dispatch decisions
//! - The recognize → dedup → enrich → translate → emit pipeline
//! - Session statistics and state management

mod config;
mod events;
mod session;
mod stats;

pub use config::{is_valid_language_code, SessionConfig};
pub use events::{AudioFrameData, ClientEvent, ServerEvent};
pub use session::{PipelineShared, Session, SessionState};
pub use stats::{SessionCounters, SessionStats};
