//! PCM decoding for synthesized speech
//!
//! The speech collaborator returns raw signed 16-bit little-endian PCM,
//! base64-encoded, 24 kHz mono. Decoding maps each sample to a float in
//! [-1.0, 1.0) for the audio sink.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use relume_common::{Error, Result};
use relume_genai::SpeechClip;

/// Decoded audio ready for playback
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0)
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Playback length
    pub fn duration(&self) -> std::time::Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return std::time::Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        std::time::Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }
}

/// Decode a base64 PCM16 clip into float samples
pub fn decode_clip(clip: &SpeechClip) -> Result<DecodedAudio> {
    let bytes = STANDARD
        .decode(&clip.pcm_base64)
        .map_err(|e| Error::Validation(format!("invalid base64 audio payload: {}", e)))?;

    if bytes.len() % 2 != 0 {
        return Err(Error::Validation(
            "PCM16 payload has an odd byte length".to_string(),
        ));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: clip.sample_rate,
        channels: clip.channels,
    })
}
