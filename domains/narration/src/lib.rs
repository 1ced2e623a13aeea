//! Narration domain: single-slot, latest-wins speech playback
//!
//! At most one utterance is audible at a time. Every `speak` call takes a
//! fresh monotonically increasing request token; when its synthesis
//! resolves, the result is applied only if the token is still the most
//! recently issued one. A stale resolution produces no playback and no
//! state change.

pub mod pcm;
pub mod sink;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use relume_genai::SpeechSynthesizer;

pub use pcm::{decode_clip, DecodedAudio};
pub use sink::{AudioSink, NullSink, PlaybackError};

/// Canned reminder about the retention window, read aloud from the gallery
pub const RETENTION_REMINDER: &str = "Your new works are only kept for 24 hours. \
Remember to save them to your phone album before they fade away.";

/// Single-slot playback coordinator for synthesized speech
pub struct NarrationChannel {
    speech: Arc<dyn SpeechSynthesizer>,
    sink: Arc<dyn AudioSink>,
    latest: AtomicU64,
    /// Serializes token updates against the stale re-check and playback
    /// start, so a stale request can never reach the sink after a newer
    /// request has claimed the slot.
    slot: Mutex<()>,
}

impl NarrationChannel {
    pub fn new(speech: Arc<dyn SpeechSynthesizer>, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            speech,
            sink,
            latest: AtomicU64::new(0),
            slot: Mutex::new(()),
        }
    }

    /// Issue a narration request. Stops current playback immediately,
    /// synthesizes in the background, and plays the result only if no
    /// newer request has been issued meanwhile. Returns the request token.
    pub fn speak(self: &Arc<Self>, text: impl Into<String>) -> u64 {
        let id = {
            let _slot = self.slot.lock().unwrap();
            let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            self.sink.stop();
            id
        };

        let this = Arc::clone(self);
        let text = text.into();
        tokio::spawn(async move {
            this.run_request(id, text).await;
        });

        id
    }

    /// Read the retention reminder aloud
    pub fn remind_retention(self: &Arc<Self>) -> u64 {
        self.speak(RETENTION_REMINDER)
    }

    /// Halt playback unconditionally; safe when nothing is playing
    pub fn stop(&self) {
        let _slot = self.slot.lock().unwrap();
        self.sink.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.sink.is_playing()
    }

    async fn run_request(&self, id: u64, text: String) {
        let clip = match self.speech.synthesize(&text).await {
            Ok(Some(clip)) => clip,
            Ok(None) => {
                tracing::debug!(request = id, "Synthesis yielded no audio");
                return;
            }
            Err(e) => {
                tracing::warn!(request = id, error = %e, "Speech synthesis failed");
                return;
            }
        };

        // Stale-response suppression: a newer request owns the slot now.
        // Checked again under the slot lock below; this early exit just
        // skips a pointless decode.
        if self.latest.load(Ordering::SeqCst) != id {
            tracing::debug!(request = id, "Discarding stale narration");
            return;
        }

        let audio = match pcm::decode_clip(&clip) {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(request = id, error = %e, "Audio payload undecodable");
                return;
            }
        };

        // The re-check and the start must be one atomic step: a request
        // that went stale during the decode must not reach the sink.
        let _slot = self.slot.lock().unwrap();
        if self.latest.load(Ordering::SeqCst) != id {
            tracing::debug!(request = id, "Discarding stale narration");
            return;
        }

        if let Err(e) = self.sink.start(audio) {
            // Autoplay-style rejection is non-fatal; reset playback state
            tracing::warn!(request = id, error = %e, "Playback rejected");
            self.sink.stop();
        }
    }
}
