//! Relume generation collaborator
//!
//! Provides the three remote generation surfaces the restoration flow
//! depends on:
//! - photo restoration (single request/response with an inline image payload)
//! - image-to-video generation (long-running operation, polled to completion)
//! - speech synthesis (base64 PCM clip, or nothing on failure)
//!
//! Each surface is a trait so the orchestrator never sees the wire. The
//! `gemini` module implements them against the Gemini REST API; the `mock`
//! module provides programmable stand-ins for tests and development.

pub mod gemini;
pub mod mock;

use std::sync::Arc;

use relume_common::CredentialStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("Generation configuration error: {0}")]
    Configuration(String),

    #[error("Generation request error: {0}")]
    Request(String),

    #[error("Generation response error: {0}")]
    Response(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("API key rejected: {0}")]
    InvalidKey(String),
}

/// Request to restore and colorize a photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub image_base64: String,
    pub mime_type: String,
    pub instructions: String,
}

/// An inline image payload returned by the generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data_base64: String,
}

impl InlineImage {
    /// Render as a locally referenceable data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

/// Result of a photo restoration call.
///
/// The image may legitimately be absent (the model answered with text only);
/// the caller decides whether that is a hard failure.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub image: Option<InlineImage>,
    pub narration: Option<String>,
}

/// Request to animate a photo into a short video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
}

/// Handle for a long-running video generation operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub name: String,
}

/// Poll result for a long-running operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStatus {
    pub done: bool,
    pub result_uri: Option<String>,
}

/// A synthesized speech clip: raw signed 16-bit little-endian PCM, base64
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    pub pcm_base64: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechClip {
    pub fn new(pcm_base64: impl Into<String>) -> Self {
        Self {
            pcm_base64: pcm_base64.into(),
            sample_rate: 24_000,
            channels: 1,
        }
    }
}

/// Photo restoration surface
#[async_trait::async_trait]
pub trait ImageRestorer: Send + Sync {
    async fn restore(&self, request: RestoreRequest) -> Result<RestoreOutcome, GenAiError>;
}

/// Image-to-video surface: submit, then poll the handle until done, then
/// fetch the binary payload behind the result locator.
#[async_trait::async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn start(&self, request: VideoRequest) -> Result<OperationHandle, GenAiError>;
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, GenAiError>;
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, GenAiError>;
}

/// Speech synthesis surface. `None` means the collaborator had nothing to
/// say (synthesis failures are non-fatal by contract).
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Option<SpeechClip>, GenAiError>;
}

/// The full set of generation services the app wires together
#[derive(Clone)]
pub struct GenAiServices {
    pub restorer: Arc<dyn ImageRestorer>,
    pub video: Arc<dyn VideoGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

/// Generation service configuration
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub provider: String,
    pub base_url: String,
}

/// Factory for creating the generation service set
pub struct GenAiFactory;

impl GenAiFactory {
    pub fn create(
        config: GenAiConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<GenAiServices, GenAiError> {
        match config.provider.as_str() {
            "gemini" => {
                tracing::info!(base_url = %config.base_url, "Creating Gemini generation services");
                let client = Arc::new(gemini::GeminiClient::new(config.base_url, credentials));
                Ok(GenAiServices {
                    restorer: client.clone(),
                    video: client.clone(),
                    speech: client,
                })
            }
            "mock" => {
                tracing::info!("Creating mock generation services");
                Ok(GenAiServices {
                    restorer: Arc::new(mock::MockImageRestorer::new()),
                    video: Arc::new(mock::MockVideoGenerator::new()),
                    speech: Arc::new(mock::MockSpeechSynthesizer::new()),
                })
            }
            provider => Err(GenAiError::Configuration(format!(
                "Unknown generation provider: {}. Supported providers: gemini, mock",
                provider
            ))),
        }
    }
}
