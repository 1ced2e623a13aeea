//! Gemini REST API implementation
//!
//! Calls the Gemini generateContent endpoint for photo restoration and
//! speech synthesis, and the predictLongRunning/operations pair for video
//! generation, using the reqwest HTTP client. The API key is read from the
//! injected credential store on every call, so a key supplied mid-session
//! takes effect without rebuilding the client.

use std::sync::Arc;

use relume_common::CredentialStore;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    GenAiError, ImageRestorer, InlineImage, OperationHandle, OperationStatus, RestoreOutcome,
    RestoreRequest, SpeechClip, SpeechSynthesizer, VideoGenerator, VideoRequest,
};

const API_VERSION: &str = "v1beta";
const RESTORE_MODEL: &str = "gemini-3-pro-image-preview";
const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const TTS_VOICE: &str = "Kore";

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    image_size: String,
    aspect_ratio: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

/// predictLongRunning request body (video generation)
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
    image: PredictImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    number_of_videos: u32,
    resolution: String,
    aspect_ratio: String,
}

/// Long-running operation resource
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: String,
    message: String,
}

/// Gemini generation client implementing all three collaborator surfaces
pub struct GeminiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl GeminiClient {
    pub fn new(base_url: String, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            credentials,
        }
    }

    fn api_key(&self) -> Result<String, GenAiError> {
        self.credentials
            .get()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenAiError::InvalidKey("no API key configured".to_string()))
    }

    async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, model
        );

        tracing::debug!(model = %model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| GenAiError::Request(format!("HTTP request failed: {}", e)))?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to parse response: {}", e)))
    }
}

/// Map non-success statuses into the error taxonomy. Invalid-key class
/// covers 400/401/403/404: the upstream reports a bad key as either
/// INVALID_ARGUMENT or "requested entity was not found".
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenAiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GenAiError::RateLimit);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => format!("{}: {}", parsed.error.status, parsed.error.message),
        Err(_) => format!("{}: {}", status, body),
    };

    match status.as_u16() {
        400 | 401 | 403 | 404 => Err(GenAiError::InvalidKey(message)),
        _ => Err(GenAiError::Response(message)),
    }
}

#[async_trait::async_trait]
impl ImageRestorer for GeminiClient {
    async fn restore(&self, request: RestoreRequest) -> Result<RestoreOutcome, GenAiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: request.mime_type,
                            data: request.image_base64,
                        }),
                    },
                    Part {
                        text: Some(request.instructions),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: None,
                image_config: Some(ImageConfig {
                    image_size: "1K".to_string(),
                    aspect_ratio: "1:1".to_string(),
                }),
                speech_config: None,
            }),
        };

        let response = self.generate_content(RESTORE_MODEL, &body).await?;

        let mut image = None;
        let mut narration = None;
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(data) = part.inline_data {
                image = Some(InlineImage {
                    mime_type: data.mime_type,
                    data_base64: data.data,
                });
            } else if let Some(text) = part.text {
                narration = Some(text);
            }
        }

        Ok(RestoreOutcome { image, narration })
    }
}

#[async_trait::async_trait]
impl VideoGenerator for GeminiClient {
    async fn start(&self, request: VideoRequest) -> Result<OperationHandle, GenAiError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/{}/models/{}:predictLongRunning",
            self.base_url, API_VERSION, VIDEO_MODEL
        );

        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt,
                image: PredictImage {
                    bytes_base64_encoded: request.image_base64,
                    mime_type: request.mime_type,
                },
            }],
            parameters: PredictParameters {
                number_of_videos: 1,
                resolution: "720p".to_string(),
                aspect_ratio: "16:9".to_string(),
            },
        };

        tracing::debug!("Submitting Gemini video generation");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenAiError::Request(format!("HTTP request failed: {}", e)))?;

        let operation: Operation = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to parse operation: {}", e)))?;

        Ok(OperationHandle {
            name: operation.name,
        })
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, GenAiError> {
        let key = self.api_key()?;
        let url = format!("{}/{}/{}", self.base_url, API_VERSION, handle.name);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &key)
            .send()
            .await
            .map_err(|e| GenAiError::Request(format!("HTTP request failed: {}", e)))?;

        let operation: Operation = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to parse operation: {}", e)))?;

        let result_uri = operation
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        Ok(OperationStatus {
            done: operation.done,
            result_uri,
        })
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, GenAiError> {
        let key = self.api_key()?;
        let separator = if locator.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", locator, separator, key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GenAiError::Request(format!("HTTP request failed: {}", e)))?;

        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenAiError::Response(format!("Failed to read payload: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GeminiClient {
    /// Synthesis is best-effort: any failure becomes `None` so narration
    /// never blocks or fails a restoration.
    async fn synthesize(&self, text: &str) -> Result<Option<SpeechClip>, GenAiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(format!(
                        "In a very warm, gentle, unhurried voice, like an old friend, say: {}",
                        text
                    )),
                    inline_data: None,
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                image_config: None,
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: TTS_VOICE.to_string(),
                        },
                    },
                }),
            }),
        };

        let response = match self.generate_content(TTS_MODEL, &body).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed");
                return Ok(None);
            }
        };

        let clip = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.inline_data)
            .map(|data| SpeechClip::new(data.data));

        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: "aGk=".to_string(),
                        }),
                    },
                    Part {
                        text: Some("restore this".to_string()),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: None,
                image_config: Some(ImageConfig {
                    image_size: "1K".to_string(),
                    aspect_ratio: "1:1".to_string(),
                }),
                speech_config: None,
            }),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "restore this");
        assert_eq!(json["generationConfig"]["imageConfig"]["imageSize"], "1K");
        // Absent options are omitted, not serialized as null
        assert!(json["contents"][0]["parts"][0].get("text").is_none());
    }

    #[test]
    fn test_operation_response_parsing() {
        let json = r#"{
            "name": "models/veo/operations/abc123",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        {"video": {"uri": "https://example.com/video.mp4"}}
                    ]
                }
            }
        }"#;

        let operation: Operation = serde_json::from_str(json).unwrap();
        assert!(operation.done);
        assert_eq!(operation.name, "models/veo/operations/abc123");

        let uri = operation
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        assert_eq!(uri.as_deref(), Some("https://example.com/video.mp4"));
    }

    #[test]
    fn test_pending_operation_parsing() {
        let json = r#"{"name": "models/veo/operations/abc123"}"#;
        let operation: Operation = serde_json::from_str(json).unwrap();
        assert!(!operation.done);
        assert!(operation.response.is_none());
    }

    #[test]
    fn test_error_response_parsing() {
        let json = r#"{"error": {"status": "INVALID_ARGUMENT", "message": "API key not valid"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.status, "INVALID_ARGUMENT");
        assert_eq!(parsed.error.message, "API key not valid");
    }
}
