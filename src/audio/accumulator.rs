use std::time::{Duration, Instant};

use tracing::debug;

use super::decoder::FrameDecoder;
use crate::config::AudioConfig;

/// Whether a dispatched segment is an interim hypothesis or the final flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Interim,
    Final,
}

/// A contiguous span of PCM audio dispatched as one recognition request.
///
/// Immutable once taken from the accumulator; ownership moves into the
/// recognition call.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub kind: SegmentKind,
}

impl AudioSegment {
    pub fn duration(&self) -> Duration {
        // 2 bytes per sample, mono
        let samples = self.pcm.len() as u64 / 2;
        Duration::from_millis(samples * 1000 / self.sample_rate as u64)
    }

    /// Mean absolute amplitude over the whole segment. Used by the silence
    /// gate: an all-near-zero segment is not worth a recognition call.
    pub fn mean_amplitude(&self) -> i16 {
        let mut sum: u64 = 0;
        let mut count: u64 = 0;
        for sample in FrameDecoder::samples(&self.pcm) {
            sum += sample.unsigned_abs() as u64;
            count += 1;
        }
        if count == 0 {
            return 0;
        }
        (sum / count).min(i16::MAX as u64) as i16
    }

    pub fn is_silent(&self, threshold: i16) -> bool {
        self.mean_amplitude() < threshold
    }
}

/// Per-session rolling PCM buffer with size/interval dispatch decisions.
///
/// Dispatch fires once the buffer holds enough audio AND enough wall time has
/// passed since the previous dispatch, bounding both recognition-call cost
/// and end-to-end latency. After an interim dispatch a short trailing tail is
/// retained so segment boundaries do not cut words; a final flush clears the
/// buffer entirely.
pub struct SegmentAccumulator {
    config: AudioConfig,
    buffer: Vec<u8>,
    last_dispatch: Option<Instant>,
}

impl SegmentAccumulator {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            last_dispatch: None,
        }
    }

    /// Append decoded PCM bytes to the rolling buffer.
    pub fn append(&mut self, pcm: &[u8]) {
        self.buffer.extend_from_slice(pcm);
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True when the buffer is ready for an interim recognition dispatch.
    pub fn should_dispatch(&self, now: Instant) -> bool {
        if self.buffer.len() < self.config.segment_threshold_bytes {
            return false;
        }
        match self.last_dispatch {
            None => true,
            Some(last) => {
                now.duration_since(last)
                    >= Duration::from_millis(self.config.min_dispatch_interval_ms)
            }
        }
    }

    /// Detach the buffered audio as an immutable segment.
    ///
    /// Interim dispatches keep the trailing `interim_tail_bytes` for acoustic
    /// context (tail size is a tuning parameter, not a contract); a final
    /// flush clears everything.
    pub fn take_segment(&mut self, kind: SegmentKind, now: Instant) -> AudioSegment {
        let pcm = match kind {
            SegmentKind::Interim => {
                let tail_len = self.config.interim_tail_bytes.min(self.buffer.len());
                // Keep sample alignment when splitting the tail off
                let tail_len = tail_len - (tail_len % 2);
                let tail_start = self.buffer.len() - tail_len;
                let tail = self.buffer[tail_start..].to_vec();
                // Dispatch the whole buffer; the tail doubles as acoustic
                // context at the start of the next segment.
                std::mem::replace(&mut self.buffer, tail)
            }
            SegmentKind::Final => std::mem::take(&mut self.buffer),
        };

        self.last_dispatch = Some(now);
        debug!(
            "Segment taken: {} bytes ({:?}), {} bytes retained",
            pcm.len(),
            kind,
            self.buffer.len()
        );

        AudioSegment {
            pcm,
            sample_rate: self.config.sample_rate,
            kind,
        }
    }

    /// Drop all buffered audio and dispatch history (start/disconnect reset).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_dispatch = None;
    }

    pub fn silence_threshold(&self) -> i16 {
        self.config.silence_threshold
    }
}
