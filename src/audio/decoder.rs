use base64::Engine;
use tracing::debug;

use crate::error::{Result, StreamscribeError};

/// Audio payload shapes accepted from a connection.
///
/// Clients send audio either as binary WebSocket frames (raw little-endian
/// PCM bytes), as JSON arrays of signed 16-bit samples, or as base64-encoded
/// byte strings inside a JSON event.
#[derive(Debug, Clone)]
pub enum AudioPayload {
    /// Interleaved signed 16-bit samples
    Samples(Vec<i16>),
    /// Raw little-endian PCM bytes
    Bytes(Vec<u8>),
    /// Base64-encoded little-endian PCM bytes
    Base64(String),
}

/// Normalizes inbound audio payloads into canonical 16-bit LE mono PCM bytes.
///
/// No resampling happens here: the service contract is 16kHz mono 16-bit PCM
/// and each shape is reinterpreted losslessly. Malformed payloads fail with a
/// decode error; the caller logs and drops the frame without ending the
/// session.
pub struct FrameDecoder;

impl FrameDecoder {
    pub fn decode(payload: AudioPayload) -> Result<Vec<u8>> {
        match payload {
            AudioPayload::Samples(samples) => {
                let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
                Ok(pcm)
            }
            AudioPayload::Bytes(bytes) => {
                if bytes.len() % 2 != 0 {
                    return Err(StreamscribeError::decode(format!(
                        "byte buffer length {} is not a whole number of 16-bit samples",
                        bytes.len()
                    )));
                }
                Ok(bytes)
            }
            AudioPayload::Base64(encoded) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| {
                        StreamscribeError::decode(format!("invalid base64 audio payload: {}", e))
                    })?;
                if bytes.len() % 2 != 0 {
                    return Err(StreamscribeError::decode(format!(
                        "decoded payload length {} is not a whole number of 16-bit samples",
                        bytes.len()
                    )));
                }
                debug!("Decoded base64 audio payload ({} bytes)", bytes.len());
                Ok(bytes)
            }
        }
    }

    /// View PCM bytes as i16 samples (little-endian).
    pub fn samples(pcm: &[u8]) -> impl Iterator<Item = i16> + '_ {
        pcm.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]]))
    }
}
