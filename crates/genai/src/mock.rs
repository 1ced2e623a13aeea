//! Mock generation services
//!
//! Programmable mocks for testing the restoration workflow:
//! - `MockImageRestorer`: configurable outcome with request recording
//! - `MockVideoGenerator`: scripted long-running operation (N polls to done)
//! - `MockSpeechSynthesizer`: records requests, per-text resolution delays

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{
    GenAiError, ImageRestorer, InlineImage, OperationHandle, OperationStatus, RestoreOutcome,
    RestoreRequest, SpeechClip, SpeechSynthesizer, VideoGenerator, VideoRequest,
};

/// A short valid PCM16 payload (four mono samples), base64-encoded
pub fn pcm_fixture_base64() -> String {
    STANDARD.encode([0x00u8, 0x00, 0xFF, 0x7F, 0x00, 0x80, 0x34, 0x12])
}

/// What outcome the mock restorer should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockRestoreOutcome {
    /// Inline image plus narration text
    #[default]
    Succeed,
    /// Text-only response with no image payload
    EmptyImage,
    /// Invalid-key class failure
    InvalidKey,
    /// Transient service failure
    Fail,
}

/// Mock photo restorer with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockImageRestorer {
    outcome: Arc<RwLock<MockRestoreOutcome>>,
    narration: Arc<RwLock<Option<String>>>,
    history: Arc<Mutex<Vec<RestoreRequest>>>,
}

impl MockImageRestorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, outcome: MockRestoreOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// Override the narration text returned alongside the restored image.
    /// `None` simulates a model that returned an image with no commentary.
    pub fn set_narration(&self, narration: Option<String>) {
        *self.narration.write().unwrap() = narration;
    }

    pub fn recorded_requests(&self) -> Vec<RestoreRequest> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageRestorer for MockImageRestorer {
    async fn restore(&self, request: RestoreRequest) -> Result<RestoreOutcome, GenAiError> {
        tracing::info!("Mock restorer: received restore request");
        self.history.lock().unwrap().push(request);

        let narration = self.narration.read().unwrap().clone();
        match self.outcome.read().unwrap().clone() {
            MockRestoreOutcome::Succeed => Ok(RestoreOutcome {
                image: Some(InlineImage {
                    mime_type: "image/png".to_string(),
                    data_base64: STANDARD.encode(b"mock restored image"),
                }),
                narration: narration
                    .or_else(|| Some("What a treasured moment this photo holds.".to_string())),
            }),
            MockRestoreOutcome::EmptyImage => Ok(RestoreOutcome {
                image: None,
                narration,
            }),
            MockRestoreOutcome::InvalidKey => Err(GenAiError::InvalidKey(
                "INVALID_ARGUMENT: API key not valid".to_string(),
            )),
            MockRestoreOutcome::Fail => Err(GenAiError::Response(
                "Mock generation failure".to_string(),
            )),
        }
    }
}

/// What outcome the mock video generator should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockVideoOutcome {
    /// Complete after `polls_until_done` polls with a result locator
    #[default]
    Complete,
    /// Complete but report no result locator
    NoResultUri,
    /// Never report done (exercises the polling timeout guard)
    NeverDone,
    /// Invalid-key class failure on submit
    InvalidKey,
    /// Transient failure on submit
    Fail,
}

/// Mock video generator: a scripted long-running operation
#[derive(Debug, Clone)]
pub struct MockVideoGenerator {
    outcome: Arc<RwLock<MockVideoOutcome>>,
    polls_until_done: Arc<RwLock<u32>>,
    poll_count: Arc<AtomicU32>,
    history: Arc<Mutex<Vec<VideoRequest>>>,
}

impl Default for MockVideoGenerator {
    fn default() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(MockVideoOutcome::Complete)),
            polls_until_done: Arc::new(RwLock::new(2)),
            poll_count: Arc::new(AtomicU32::new(0)),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockVideoGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, outcome: MockVideoOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    pub fn set_polls_until_done(&self, polls: u32) {
        *self.polls_until_done.write().unwrap() = polls;
    }

    pub fn polls_observed(&self) -> u32 {
        self.poll_count.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<VideoRequest> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VideoGenerator for MockVideoGenerator {
    async fn start(&self, request: VideoRequest) -> Result<OperationHandle, GenAiError> {
        tracing::info!("Mock video: received generation request");
        self.history.lock().unwrap().push(request);
        self.poll_count.store(0, Ordering::SeqCst);

        match *self.outcome.read().unwrap() {
            MockVideoOutcome::InvalidKey => Err(GenAiError::InvalidKey(
                "INVALID_ARGUMENT: API key not valid".to_string(),
            )),
            MockVideoOutcome::Fail => {
                Err(GenAiError::Response("Mock generation failure".to_string()))
            }
            _ => Ok(OperationHandle {
                name: "models/veo/operations/mock".to_string(),
            }),
        }
    }

    async fn poll(&self, _handle: &OperationHandle) -> Result<OperationStatus, GenAiError> {
        let count = self.poll_count.fetch_add(1, Ordering::SeqCst) + 1;
        let needed = *self.polls_until_done.read().unwrap();

        match *self.outcome.read().unwrap() {
            MockVideoOutcome::NeverDone => Ok(OperationStatus {
                done: false,
                result_uri: None,
            }),
            MockVideoOutcome::NoResultUri if count >= needed => Ok(OperationStatus {
                done: true,
                result_uri: None,
            }),
            _ if count >= needed => Ok(OperationStatus {
                done: true,
                result_uri: Some("https://mock-storage.example.com/video.mp4".to_string()),
            }),
            _ => Ok(OperationStatus {
                done: false,
                result_uri: None,
            }),
        }
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, GenAiError> {
        tracing::info!(locator = %locator, "Mock video: fetching payload");
        Ok(b"mock video payload".to_vec())
    }
}

/// Mock speech synthesizer.
///
/// Resolution can be delayed per text (with a paused tokio clock this gives
/// tests deterministic control over which request resolves first), and
/// synthesis can be forced to fail, which the contract maps to `None`.
#[derive(Debug, Clone)]
pub struct MockSpeechSynthesizer {
    delay_ms: Arc<RwLock<u64>>,
    per_text_delay_ms: Arc<RwLock<HashMap<String, u64>>>,
    fail: Arc<RwLock<bool>>,
    history: Arc<Mutex<Vec<String>>>,
}

impl Default for MockSpeechSynthesizer {
    fn default() -> Self {
        Self {
            delay_ms: Arc::new(RwLock::new(0)),
            per_text_delay_ms: Arc::new(RwLock::new(HashMap::new())),
            fail: Arc::new(RwLock::new(false)),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockSpeechSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_delay_ms(&self, delay: u64) {
        *self.delay_ms.write().unwrap() = delay;
    }

    pub fn set_delay_for(&self, text: impl Into<String>, delay_ms: u64) {
        self.per_text_delay_ms
            .write()
            .unwrap()
            .insert(text.into(), delay_ms);
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }

    pub fn synthesized_texts(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Option<SpeechClip>, GenAiError> {
        self.history.lock().unwrap().push(text.to_string());

        let delay = self
            .per_text_delay_ms
            .read()
            .unwrap()
            .get(text)
            .copied()
            .unwrap_or(*self.delay_ms.read().unwrap());
        if delay > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
        }

        if *self.fail.read().unwrap() {
            return Ok(None);
        }

        Ok(Some(SpeechClip::new(pcm_fixture_base64())))
    }
}
