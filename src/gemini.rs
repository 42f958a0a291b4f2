//! Client for the Gemini text and Imagen image generation APIs.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};

use crate::error::ComicgenError;
use crate::generator::ComicBackend;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for story-to-panel text generation.
pub const TEXT_MODEL: &str = "gemini-2.0-flash-exp";

/// Model used for panel image generation.
pub const IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Gemini API client; cheap to clone, holds a pooled HTTP client.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

// generateContent request/response shapes.
// The API takes `contents` with `parts`, and answers with
// `candidates[0].content.parts[*].text`. Auth rides in a `?key=` query
// parameter rather than a header.

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

// Imagen :predict request/response shapes.

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u8,
    aspect_ratio: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

impl GeminiClient {
    /// Creates a client for the given API key.
    ///
    /// Fails when the key is missing so misconfiguration surfaces at
    /// startup instead of on the first request.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ComicgenError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ComicgenError::Configuration(
                "No API key provided. Please provide an API key or set the \
                 GEMINI_API_KEY environment variable."
                    .to_string(),
            ));
        }
        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl ComicBackend for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ComicgenError> {
        let url = format!("{API_BASE}/models/{TEXT_MODEL}:generateContent");
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                ComicgenError::TextGeneration(format!("request to Gemini failed: {err}"))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            ComicgenError::TextGeneration(format!("failed reading Gemini response: {err}"))
        })?;
        if !status.is_success() {
            return Err(ComicgenError::TextGeneration(format!(
                "Gemini API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes).map_err(|err| {
            ComicgenError::TextGeneration(format!("failed to parse Gemini response: {err}"))
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ComicgenError::TextGeneration(
                "Gemini returned no text candidates".to_string(),
            ));
        }
        Ok(text)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ComicgenError> {
        let url = format!("{API_BASE}/models/{IMAGE_MODEL}:predict");
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                // square format for comic panels
                aspect_ratio: "1:1",
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                ComicgenError::ImageGeneration(format!("request to Imagen failed: {err}"))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            ComicgenError::ImageGeneration(format!("failed reading Imagen response: {err}"))
        })?;
        if !status.is_success() {
            return Err(ComicgenError::ImageGeneration(format!(
                "Imagen API error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: PredictResponse = serde_json::from_slice(&bytes).map_err(|err| {
            ComicgenError::ImageGeneration(format!("failed to parse Imagen response: {err}"))
        })?;

        let payload = parsed
            .predictions
            .into_iter()
            .next()
            .and_then(|prediction| prediction.bytes_base64_encoded)
            .ok_or_else(|| {
                ComicgenError::ImageGeneration("no images generated in response".to_string())
            })?;

        general_purpose::STANDARD.decode(payload).map_err(|err| {
            ComicgenError::ImageGeneration(format!("failed to decode image payload: {err}"))
        })
    }

    fn api_key_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_an_empty_api_key() {
        assert!(matches!(
            GeminiClient::new(""),
            Err(ComicgenError::Configuration(_))
        ));
        assert!(matches!(
            GeminiClient::new("   "),
            Err(ComicgenError::Configuration(_))
        ));
        assert!(GeminiClient::new("key-123").is_ok());
    }

    #[test]
    fn text_request_matches_the_wire_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn image_request_matches_the_wire_shape() {
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt: "a fox" }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
            },
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "instances": [{"prompt": "a fox"}],
                "parameters": {"sampleCount": 1, "aspectRatio": "1:1"}
            })
        );
    }

    #[test]
    fn text_response_extracts_candidate_parts() {
        let raw = json!({
            "candidates": [
                {"content": {"parts": [{"text": "PANEL 1\n"}, {"text": "SCENE: A hill"}]}}
            ]
        });
        let parsed: GenerateContentResponse =
            serde_json::from_value(raw).expect("deserialize");
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.clone())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(text, "PANEL 1\nSCENE: A hill");
    }

    #[test]
    fn image_response_reads_base64_payload() {
        let raw = json!({
            "predictions": [{"bytesBase64Encoded": "aGk=", "mimeType": "image/png"}]
        });
        let parsed: PredictResponse = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(
            parsed.predictions[0].bytes_base64_encoded.as_deref(),
            Some("aGk=")
        );
    }
}
