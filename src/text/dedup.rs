//! Near-repeat suppression for streaming recognition output.
//!
//! Streaming backends re-emit growing partial hypotheses for the same
//! utterance; forwarding each one would flood the client with near-identical
//! lines. A new hypothesis is only worth emitting when it differs enough
//! from the previously emitted text.

use crate::audio::SegmentKind;

/// Growth/shrink ratio thresholds per result kind.
///
/// Finals are expected to land close to the last interim, so they get the
/// tighter ratio. Both values are empirical and may need tuning per backend.
#[derive(Debug, Clone, Copy)]
pub struct DedupConfig {
    pub interim_ratio: f32,
    pub final_ratio: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            interim_ratio: 0.20,
            final_ratio: 0.10,
        }
    }
}

pub struct ResultDeduplicator {
    config: DedupConfig,
}

impl ResultDeduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Whether `new_text` should be suppressed as a near-repeat of
    /// `last_text`, the previously emitted transcript for the session.
    ///
    /// Emitted (not a duplicate) when any of:
    /// - nothing was emitted before,
    /// - the text grew or shrank by more than the kind's ratio,
    /// - neither string contains the other.
    ///
    /// Empty or whitespace-only text is always suppressed, duplicate or not.
    pub fn is_duplicate(&self, new_text: &str, last_text: &str, kind: SegmentKind) -> bool {
        let new_trimmed = new_text.trim();
        if new_trimmed.is_empty() {
            return true;
        }

        let last_trimmed = last_text.trim();
        if last_trimmed.is_empty() {
            return false;
        }

        let ratio = match kind {
            SegmentKind::Interim => self.config.interim_ratio,
            SegmentKind::Final => self.config.final_ratio,
        };

        let new_len = new_trimmed.chars().count() as f32;
        let last_len = last_trimmed.chars().count() as f32;

        // Grew past the threshold: new content worth showing
        if new_len > last_len * (1.0 + ratio) {
            return false;
        }
        // Shrank past the symmetric threshold: backend revised downward
        if new_len < last_len * (1.0 - ratio) {
            return false;
        }
        // Similar length but textually unrelated
        if !new_trimmed.contains(last_trimmed) && !last_trimmed.contains(new_trimmed) {
            return false;
        }

        true
    }
}
