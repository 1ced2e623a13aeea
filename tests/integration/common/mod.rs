//! Shared fixtures for the integration suites

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use relume_common::{Config, InMemoryCredentialStore};
use relume_genai::mock::{MockImageRestorer, MockSpeechSynthesizer, MockVideoGenerator};
use relume_genai::GenAiServices;
use relume_ledger::CreditLedger;
use relume_narration::{AudioSink, DecodedAudio, NarrationChannel, PlaybackError};
use relume_restoration::{PollPolicy, RestorationFlow, SourceImage};
use relume_works::WorkGallery;

/// Configuration wired to the mock generation provider
pub fn mock_config() -> Config {
    Config {
        genai_provider: "mock".to_string(),
        gemini_api_key: Some("sk-test".to_string()),
        gemini_base_url: "http://localhost".to_string(),
        initial_energy: 10,
        poll_interval_secs: 10,
        poll_max_attempts: 90,
        retention_hours: 24,
        sweep_period_secs: 60,
        rust_log: "relume=debug".to_string(),
    }
}

pub fn sample_source() -> SourceImage {
    SourceImage::new("aGVsbG8=", "image/jpeg")
}

/// Audio sink that counts how many clips were ever started
#[derive(Debug, Default)]
pub struct RecordingSink {
    starts: AtomicU32,
    playing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }
}

impl AudioSink for RecordingSink {
    fn start(&self, _audio: DecodedAudio) -> Result<(), PlaybackError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
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

/// A restoration flow wired entirely to programmable mocks
pub struct TestHarness {
    pub flow: Arc<RestorationFlow>,
    pub restorer: Arc<MockImageRestorer>,
    pub video: Arc<MockVideoGenerator>,
    pub speech: Arc<MockSpeechSynthesizer>,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub ledger: Arc<CreditLedger>,
    pub gallery: Arc<WorkGallery>,
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn new(initial_energy: u32) -> Self {
        let restorer = Arc::new(MockImageRestorer::new());
        let video = Arc::new(MockVideoGenerator::new());
        let speech = Arc::new(MockSpeechSynthesizer::new());
        let credentials = Arc::new(InMemoryCredentialStore::with_key("sk-test"));
        let ledger = Arc::new(CreditLedger::new(initial_energy));
        let gallery = Arc::new(WorkGallery::new());
        let sink = Arc::new(RecordingSink::new());
        let narration = Arc::new(NarrationChannel::new(speech.clone(), sink.clone()));

        let services = GenAiServices {
            restorer: restorer.clone(),
            video: video.clone(),
            speech: speech.clone(),
        };
        let flow = Arc::new(RestorationFlow::new(
            services,
            credentials.clone(),
            ledger.clone(),
            gallery.clone(),
            narration,
            PollPolicy::new(std::time::Duration::from_secs(10), 6),
        ));

        Self {
            flow,
            restorer,
            video,
            speech,
            credentials,
            ledger,
            gallery,
            sink,
        }
    }
}
