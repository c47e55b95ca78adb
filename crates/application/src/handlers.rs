//! Transport-agnostic API handlers
//!
//! Each handler takes a raw JSON body and returns a status code with a JSON
//! body, so any HTTP layer (or the CLI `api` command) can drive them.

use crate::dtos::{ErrorResponse, SearchRequest, SearchResponse, SuggestRequest, SuggestResponse};
use crate::services::AnalysisService;
use crate::ApplicationError;
use domain::GenerationOutcome;
use llm::CancellationToken;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const SEARCH_PATH: &str = "/api/search";
pub const SUGGEST_PATH: &str = "/api/suggest";

const NO_IDEA: &str = "No idea provided";
const MISSING_SUGGEST_INPUT: &str = "Missing idea or similar_patents";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        let body = serde_json::to_value(body)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
        Self { status, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ErrorResponse::new(message))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct ApiHandlers {
    service: Arc<AnalysisService>,
    top_k: usize,
}

impl ApiHandlers {
    pub fn new(service: Arc<AnalysisService>, top_k: usize) -> Self {
        Self { service, top_k }
    }

    /// Dispatch a POST by path. The legacy route names are accepted too.
    pub async fn route(&self, path: &str, body: &str, token: &CancellationToken) -> ApiResponse {
        match path {
            SEARCH_PATH | "/api/bert_search" => self.handle_search(body).await,
            SUGGEST_PATH | "/api/gemini_suggest" => self.handle_suggest(body, token).await,
            other => ApiResponse::error(404, format!("Unknown endpoint: {other}")),
        }
    }

    /// `POST /api/search`
    pub async fn handle_search(&self, body: &str) -> ApiResponse {
        let request: SearchRequest = match parse_body(body) {
            Ok(request) => request,
            Err(response) => return response,
        };
        self.search(request).await
    }

    pub async fn search(&self, request: SearchRequest) -> ApiResponse {
        if request.idea.trim().is_empty() {
            return ApiResponse::error(400, NO_IDEA);
        }

        match self.service.find_similar(&request.idea, self.top_k).await {
            Ok(result) => {
                let partial = result.is_partial();
                ApiResponse::json(
                    200,
                    &SearchResponse {
                        similar_patents: result.into_records(),
                        partial,
                    },
                )
            }
            Err(e) => error_response(e),
        }
    }

    /// `POST /api/suggest`
    pub async fn handle_suggest(&self, body: &str, token: &CancellationToken) -> ApiResponse {
        let request: SuggestRequest = match parse_body(body) {
            Ok(request) => request,
            Err(response) => return response,
        };
        self.suggest(request, token).await
    }

    pub async fn suggest(&self, request: SuggestRequest, token: &CancellationToken) -> ApiResponse {
        if request.idea.trim().is_empty() || request.similar_patents.is_empty() {
            return ApiResponse::error(400, MISSING_SUGGEST_INPUT);
        }

        let outcome = self
            .service
            .analyze_with_cancellation(&request.idea, &request.similar_patents, token)
            .await;

        match outcome {
            Ok(GenerationOutcome::Success { text }) => {
                ApiResponse::json(200, &SuggestResponse { suggestion: text })
            }
            Ok(GenerationOutcome::Failure { kind, message }) => {
                warn!(kind = %kind, "Suggestion failed: {}", message);
                ApiResponse::error(500, message)
            }
            Err(e) => error_response(e),
        }
    }
}

fn parse_body<T: DeserializeOwned + Default>(body: &str) -> Result<T, ApiResponse> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| {
        debug!("Rejecting malformed request body: {}", e);
        ApiResponse::error(400, format!("Invalid JSON body: {e}"))
    })
}

fn error_response(err: ApplicationError) -> ApiResponse {
    let status = err.status_code();
    if status >= 500 {
        error!(category = err.category(), "Request failed: {}", err);
    }
    ApiResponse::error(status, err.to_string())
}
