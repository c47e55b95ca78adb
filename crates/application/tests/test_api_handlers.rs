//! Integration tests for AnalysisService and the API handlers
//!
//! Retrieval runs on the real flat index with the hashing embedder;
//! generation runs against an in-process scripted model.

use application::dtos::{SearchRequest, SuggestRequest};
use application::{AnalysisService, ApiHandlers, ApplicationError, SEARCH_PATH, SUGGEST_PATH};
use async_trait::async_trait;
use domain::{FailureKind, GenerationOutcome, PatentRecord};
use llm::{
    CancellationToken, GenerativeModel, ModelError, ModelResponse, RecordingSleeper,
    ResilientGenerator, RetryConfig,
};
use memory::{EmbeddingIndex, FlatIndex, HashingEmbedder, InMemoryCorpus, RetrievalEngine};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Scripted model; remembers every prompt it was sent
struct ScriptedModel {
    script: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(script: Vec<Result<ModelResponse, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_content(
        &self,
        _model: &str,
        prompt: &str,
    ) -> Result<ModelResponse, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| Err(ModelError::Other("script exhausted".into())))
    }
}

fn patents() -> Vec<PatentRecord> {
    vec![
        PatentRecord::new(
            "Solar water kettle",
            "A kettle heated by concentrated sunlight",
            "US1000001",
            "2019-03-01",
        ),
        PatentRecord::new(
            "Folding bicycle frame",
            "A bicycle frame hinged to fold in half",
            "US1000002",
            "2020-07-15",
        ),
        PatentRecord::new(
            "Smart plant pot",
            "A pot measuring soil moisture for houseplants",
            "US1000003",
            "2021-11-30",
        ),
    ]
}

struct Fixture {
    handlers: ApiHandlers,
    service: Arc<AnalysisService>,
    model: Arc<ScriptedModel>,
    sleeper: Arc<RecordingSleeper>,
}

async fn fixture(script: Vec<Result<ModelResponse, ModelError>>, top_k: usize) -> Fixture {
    let corpus = Arc::new(InMemoryCorpus::from_records(patents()));
    let embedder = Arc::new(HashingEmbedder::new(128));
    let index = FlatIndex::build(embedder.as_ref(), corpus.records())
        .await
        .expect("index builds");
    let lookup = EmbeddingIndex::new(embedder, Arc::new(index)).expect("dimensions match");
    let retrieval = RetrievalEngine::new(lookup, corpus);

    let model = ScriptedModel::new(script);
    let sleeper = Arc::new(RecordingSleeper::new());
    let generator =
        ResilientGenerator::new(model.clone(), "models/gemini-2.5-flash", RetryConfig::default())
            .with_sleeper(sleeper.clone());

    let service = Arc::new(AnalysisService::new(retrieval, generator));
    Fixture {
        handlers: ApiHandlers::new(service.clone(), top_k),
        service,
        model,
        sleeper,
    }
}

fn quota() -> Result<ModelResponse, ModelError> {
    Err(ModelError::QuotaExceeded("429 Resource has been exhausted".into()))
}

#[tokio::test]
async fn test_search_returns_ranked_patents() {
    let fx = fixture(vec![], 2).await;

    let response = fx
        .handlers
        .handle_search(r#"{"idea": "a bicycle whose frame folds on a hinge"}"#)
        .await;

    assert_eq!(response.status, 200);
    let patents = response.body["similar_patents"].as_array().unwrap();
    assert_eq!(patents.len(), 2);
    assert_eq!(patents[0]["publication_number"], "US1000002");
    assert_eq!(patents[0]["abstract"], "A bicycle frame hinged to fold in half");
    assert!(response.body.get("partial").is_none());
}

#[tokio::test]
async fn test_search_top_k_larger_than_corpus() {
    let fx = fixture(vec![], 10).await;

    let response = fx
        .handlers
        .search(SearchRequest {
            idea: "kettle".into(),
        })
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["similar_patents"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_without_idea_is_bad_request() {
    let fx = fixture(vec![], 5).await;

    for body in ["{}", r#"{"idea": ""}"#, r#"{"idea": "   "}"#, ""] {
        let response = fx.handlers.handle_search(body).await;
        assert_eq!(response.status, 400, "body {body:?}");
        assert_eq!(response.body, json!({"error": "No idea provided"}));
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let fx = fixture(vec![], 5).await;
    let response = fx.handlers.handle_search("{not json").await;
    assert_eq!(response.status, 400);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_suggest_returns_model_text() {
    let fx = fixture(vec![Ok(ModelResponse::from_text("## Patent Landscape Analysis"))], 5).await;

    let body = json!({
        "idea": "A kettle powered by the sun",
        "similar_patents": [{"title": "Solar water kettle", "publication_number": "US1000001"}]
    });
    let response = fx
        .handlers
        .handle_suggest(&body.to_string(), &CancellationToken::new())
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        json!({"suggestion": "## Patent Landscape Analysis"})
    );

    let prompts = fx.model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(
        "1. **Solar water kettle**\n   - Patent Number: US1000001\n   - Date: N/A\n   - Abstract: N/A\n\n"
    ));
}

#[tokio::test]
async fn test_suggest_missing_input_is_bad_request() {
    let fx = fixture(vec![], 5).await;
    let token = CancellationToken::new();

    for request in [
        SuggestRequest {
            idea: "idea".into(),
            similar_patents: vec![],
        },
        SuggestRequest {
            idea: "".into(),
            similar_patents: patents(),
        },
    ] {
        let response = fx.handlers.suggest(request, &token).await;
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({"error": "Missing idea or similar_patents"})
        );
    }
    assert!(fx.model.prompts().is_empty());
}

#[tokio::test]
async fn test_suggest_quota_exhaustion_is_server_error() {
    let fx = fixture(vec![quota(), quota(), quota(), quota(), quota()], 5).await;

    let response = fx
        .handlers
        .suggest(
            SuggestRequest {
                idea: "idea".into(),
                similar_patents: patents(),
            },
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(
        response.body["error"],
        "Failed to get a response from Gemini due to repeated quota limits."
    );
    assert_eq!(fx.model.prompts().len(), 5);
    assert_eq!(fx.sleeper.delays().len(), 4);
}

#[tokio::test]
async fn test_route_dispatches_current_and_legacy_paths() {
    let fx = fixture(vec![], 1).await;
    let token = CancellationToken::new();
    let body = r#"{"idea": "plant pot"}"#;

    for path in [SEARCH_PATH, "/api/bert_search"] {
        let response = fx.handlers.route(path, body, &token).await;
        assert_eq!(response.status, 200, "path {path}");
    }

    let response = fx.handlers.route(SUGGEST_PATH, "{}", &token).await;
    assert_eq!(response.status, 400);

    let response = fx.handlers.route("/api/unknown", body, &token).await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_service_two_step_flow() {
    let fx = fixture(vec![quota(), Ok(ModelResponse::from_text("analysis"))], 5).await;

    let found = fx
        .service
        .find_similar("soil moisture sensor in a plant pot", 1)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.hits()[0].record.publication_number(), Some("US1000003"));

    let outcome = fx
        .service
        .analyze("soil moisture sensor in a plant pot", &found.records())
        .await
        .unwrap();

    assert_eq!(outcome, GenerationOutcome::success("analysis"));
    assert_eq!(fx.sleeper.delays(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_service_rejects_empty_inputs() {
    let fx = fixture(vec![], 5).await;

    assert!(matches!(
        fx.service.find_similar("", 5).await,
        Err(ApplicationError::Validation { .. })
    ));
    assert!(matches!(
        fx.service.find_similar("idea", 0).await,
        Err(e) if e.status_code() == 400
    ));
    assert!(matches!(
        fx.service.analyze("idea", &[]).await,
        Err(ApplicationError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_cancelled_suggest_is_server_error() {
    let fx = fixture(vec![Ok(ModelResponse::from_text("never sent"))], 5).await;
    let token = CancellationToken::new();
    token.cancel();

    let outcome = fx
        .service
        .analyze_with_cancellation("idea", &patents(), &token)
        .await
        .unwrap();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Cancelled));

    let response = fx
        .handlers
        .suggest(
            SuggestRequest {
                idea: "idea".into(),
                similar_patents: patents(),
            },
            &token,
        )
        .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_generation_only_service_suggests_without_corpus() {
    let model = ScriptedModel::new(vec![Ok(ModelResponse::from_text("analysis"))]);
    let generator =
        ResilientGenerator::new(model.clone(), "models/gemini-2.5-flash", RetryConfig::default())
            .with_sleeper(Arc::new(RecordingSleeper::new()));
    let service = Arc::new(AnalysisService::generation_only(generator));
    assert!(!service.has_retrieval());

    let handlers = ApiHandlers::new(service.clone(), 5);
    let body = json!({"idea": "idea", "similar_patents": [{"title": "Smart plant pot"}]});
    let response = handlers
        .handle_suggest(&body.to_string(), &CancellationToken::new())
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"suggestion": "analysis"}));

    let response = handlers.handle_search(r#"{"idea": "plant pot"}"#).await;
    assert_eq!(response.status, 500);
    assert!(matches!(
        service.find_similar("plant pot", 5).await,
        Err(ApplicationError::Infrastructure { .. })
    ));
}
