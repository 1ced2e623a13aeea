//! Audio sink seam
//!
//! Playback hardware is out of scope; the channel only needs to hand a
//! decoded clip to something, stop it, and know whether it is audible.
//! `NullSink` keeps headless runs and tests honest about the state
//! transitions without producing sound.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::pcm::DecodedAudio;

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The environment refused to start playback (autoplay-style policy).
    /// Non-fatal by contract.
    #[error("Playback rejected: {0}")]
    Rejected(String),
}

/// A single-slot audio output
pub trait AudioSink: Send + Sync {
    /// Begin playing, replacing whatever was audible before
    fn start(&self, audio: DecodedAudio) -> Result<(), PlaybackError>;

    /// Halt playback; safe to call when nothing is playing
    fn stop(&self);

    fn is_playing(&self) -> bool;
}

/// Sink that accepts playback and discards the audio
#[derive(Debug, Default)]
pub struct NullSink {
    playing: AtomicBool,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for NullSink {
    fn start(&self, audio: DecodedAudio) -> Result<(), PlaybackError> {
        tracing::debug!(duration = ?audio.duration(), "NullSink playing clip");
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_tracks_state() {
        let sink = NullSink::new();
        assert!(!sink.is_playing());

        sink.start(DecodedAudio {
            samples: vec![0.0],
            sample_rate: 24_000,
            channels: 1,
        })
        .unwrap();
        assert!(sink.is_playing());

        sink.stop();
        assert!(!sink.is_playing());

        // Stopping an idle sink is safe
        sink.stop();
        assert!(!sink.is_playing());
    }
}
