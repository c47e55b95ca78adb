use super::{GenerativeModel, ModelResponse};
use crate::error::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini REST client (`POST {base}/v1beta/{model}:generateContent`).
///
/// The key travels in the `x-goog-api-key` header so it never appears in a
/// request URL, and therefore never in a transport error message.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ModelError> {
        Self::with_timeout(api_key, Duration::from_secs(60))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::Other(
                "Google AI API key cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Point the client at another host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Accepts both `models/gemini-2.5-flash` and bare `gemini-2.5-flash`
    fn endpoint(&self, model: &str) -> String {
        let model = model.trim_start_matches('/');
        if model.starts_with("models/") || model.starts_with("tunedModels/") {
            format!("{}/v1beta/{}:generateContent", self.base_url, model)
        } else {
            format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
        }
    }
}

/// Map an HTTP error response onto the model error taxonomy.
///
/// Gemini errors look like
/// `{"error": {"code": 429, "message": "...", "status": "RESOURCE_EXHAUSTED"}}`.
fn classify_error(status_code: u16, body: &str) -> ModelError {
    let parsed = serde_json::from_str::<GoogleErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    let api_status = parsed
        .as_ref()
        .and_then(|e| e.status.clone())
        .unwrap_or_default();
    let message = parsed
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let message = format!("{status_code} {message}");

    match (status_code, api_status.as_str()) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => ModelError::QuotaExceeded(message),
        (404, _) | (_, "NOT_FOUND") => ModelError::NotFound(message),
        _ => ModelError::Other(message),
    }
}

/// reqwest errors print the request URL; strip it before the message can
/// reach logs or API responses
fn transport_error(context: &str, err: reqwest::Error) -> ModelError {
    ModelError::Other(format!("{context}: {}", err.without_url()))
}

/// Concatenated text parts of the first candidate
fn extract_text(raw: &Value) -> Option<String> {
    let response = GoogleResponse::deserialize(raw).ok()?;
    let content = response.candidates.into_iter().next()?.content?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl GenerativeModel for GoogleProvider {
    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ModelResponse, ModelError> {
        let start_time = Instant::now();
        let request = GoogleRequest {
            contents: vec![GoogleContent {
                parts: vec![GooglePart {
                    text: prompt.to_string(),
                }],
                role: Some("user".to_string()),
            }],
        };

        debug!(
            "Sending request to Google AI: model={}, prompt_len={}",
            model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("Request to Google AI failed", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("Failed to read Google AI response", e))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| ModelError::Other(format!("Failed to parse response: {e}")))?;
        let text = extract_text(&raw);

        info!(
            "Received response from Google AI in {:?} (has_text={})",
            start_time.elapsed(),
            text.is_some()
        );

        Ok(ModelResponse::new(text, raw))
    }
}

// Google AI API specific request/response types
#[derive(Debug, Clone, Serialize)]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleContent {
    parts: Vec<GooglePart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct GooglePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleApiError,
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    message: Option<String>,
    status: Option<String>,
}
