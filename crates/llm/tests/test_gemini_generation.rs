//! End-to-end generation against a mocked Gemini endpoint

use domain::{FailureKind, PatentRecord};
use llm::{
    GoogleProvider, PromptBuilder, RecordingSleeper, ResilientGenerator, RetryConfig,
    QUOTA_EXHAUSTED_MESSAGE,
};
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Duration;

const MODEL: &str = "models/gemini-2.5-flash";
const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn generator(server: &Server, sleeper: Arc<RecordingSleeper>) -> ResilientGenerator {
    let provider = GoogleProvider::new("test-key")
        .expect("provider")
        .with_base_url(server.url());
    ResilientGenerator::new(Arc::new(provider), MODEL, RetryConfig::default()).with_sleeper(sleeper)
}

fn candidates() -> Vec<PatentRecord> {
    vec![PatentRecord::new(
        "Solar kettle",
        "A kettle heated by sunlight",
        "US1000001",
        "2019-03-01",
    )]
}

#[tokio::test]
async fn test_prompt_reaches_the_model_and_text_comes_back() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Regex("Solar kettle".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r###"{"candidates": [{"content": {"parts": [{"text": "## Patent Landscape Analysis"}]}}]}"###)
        .expect(1)
        .create_async()
        .await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let prompt = PromptBuilder::new().build("A kettle powered by the sun", &candidates());
    let outcome = generator(&server, sleeper.clone()).generate(&prompt).await;

    assert_eq!(outcome.text(), Some("## Patent Landscape Analysis"));
    assert!(sleeper.delays().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_persistent_quota_errors_exhaust_five_attempts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}}"#)
        .expect(5)
        .create_async()
        .await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let prompt = PromptBuilder::new().build("idea", &candidates());
    let outcome = generator(&server, sleeper.clone()).generate(&prompt).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::QuotaExceeded));
    assert!(matches!(
        outcome,
        domain::GenerationOutcome::Failure { ref message, .. } if message == QUOTA_EXHAUSTED_MESSAGE
    ));
    assert_eq!(
        sleeper.delays(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8)
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_model_fails_after_one_attempt() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": {"code": 404, "message": "models/gemini-2.5-flash is not found for API version v1beta", "status": "NOT_FOUND"}}"#)
        .expect(1)
        .create_async()
        .await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let prompt = PromptBuilder::new().build("idea", &candidates());
    let outcome = generator(&server, sleeper.clone()).generate(&prompt).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::ModelUnavailable));
    match outcome {
        domain::GenerationOutcome::Failure { message, .. } => {
            assert!(message.starts_with("Model 'models/gemini-2.5-flash' not found or supported: "));
            assert!(message.contains("is not found for API version"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(sleeper.delays().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}}"#)
        .expect(1)
        .create_async()
        .await;

    let sleeper = Arc::new(RecordingSleeper::new());
    let prompt = PromptBuilder::new().build("idea", &candidates());
    let outcome = generator(&server, sleeper.clone()).generate(&prompt).await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Unknown));
    mock.assert_async().await;
}
