use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::config::GeminiConfig;
use crate::error::AiError;

/// Error text fragments the Gemini API uses for usage-limit failures.
const QUOTA_MARKERS: [&str; 5] = [
    "quota",
    "QUOTA_EXCEEDED",
    "rate limit",
    "RATE_LIMIT_EXCEEDED",
    "RESOURCE_EXHAUSTED",
];

/// How the model should shape its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Thin HTTP client for Gemini `generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: Option<GeminiConfig>,
}

impl GeminiClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GeminiConfig>) -> Self {
        let client = config
            .as_ref()
            .and_then(|c| Client::builder().timeout(c.timeout).build().ok())
            .unwrap_or_else(Client::new);
        Self { client, config }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }

    /// Send one prompt and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Disabled` without a configuration, `AiError::QuotaExceeded`
    /// for usage-limit failures, `AiError::HttpStatus` for other non-success
    /// statuses, and `AiError::EmptyResponse` when no text comes back.
    pub async fn generate(&self, prompt: &str, format: ResponseFormat) -> Result<String, AiError> {
        let config = self.config.as_ref().ok_or(AiError::Disabled)?;

        let payload = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: match format {
                ResponseFormat::Json => Some(GenerationConfig {
                    response_mime_type: "application/json",
                }),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(config.endpoint())
            .header("x-goog-api-key", &config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            debug!(%status, %message, "gemini request rejected");
            if is_quota_failure(Some(status), &message) {
                return Err(AiError::QuotaExceeded);
            }
            return Err(AiError::HttpStatus { status, message });
        }

        let body: GenerateResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

/// Whether a failed call signals an exhausted quota or rate limit.
#[must_use]
pub fn is_quota_failure(status: Option<StatusCode>, message: &str) -> bool {
    status == Some(StatusCode::TOO_MANY_REQUESTS)
        || QUOTA_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Pull `error.message` (and `error.status`) out of an API error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: Some(detail) }) => match detail.status {
            Some(status) if !status.is_empty() => format!("{} ({status})", detail.message),
            _ => detail.message,
        },
        _ if body.trim().is_empty() => "Unknown error".to_string(),
        _ => body.trim().to_string(),
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorDetail {
    message: String,
    status: Option<String>,
}
