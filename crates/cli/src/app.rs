//! Сборка сервисов из конфигурации

use crate::progress::ProgressType;
use anyhow::{Context, Result};
use application::{AnalysisService, ApiHandlers};
use common::AppConfig;
use async_trait::async_trait;
use llm::{
    GenerativeModel, GoogleProvider, ModelError, ModelResponse, ResilientGenerator, RetryConfig,
};
use memory::{
    EmbeddingIndex, FlatIndex, HashingEmbedder, InMemoryCorpus, NeighborIndex, RetrievalEngine,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Корпус + индекс. Снапшот используется, если он задан; иначе корпус
/// эмбеддится при старте.
pub async fn build_retrieval(config: &AppConfig) -> Result<RetrievalEngine> {
    let corpus_path = &config.corpus.path;
    let corpus = InMemoryCorpus::load(corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;
    let corpus = Arc::new(corpus);

    let embedder = Arc::new(HashingEmbedder::new(config.corpus.embedding_dimension));

    let flat = match &config.corpus.index_path {
        Some(index_path) => {
            let index = FlatIndex::load(index_path).with_context(|| {
                format!("Failed to load index snapshot {}", index_path.display())
            })?;
            info!(
                rows = index.len(),
                dimension = index.dimension(),
                "Loaded index snapshot from {}",
                index_path.display()
            );
            index
        }
        None => {
            let spinner = ProgressType::Indexing
                .spinner(&format!("Embedding {} patents...", corpus.records().len()));
            let index = FlatIndex::build(embedder.as_ref(), corpus.records()).await;
            spinner.finish_and_clear();
            index.context("Failed to embed the corpus")?
        }
    };

    let index = EmbeddingIndex::new(embedder, neighbor_index(flat)?)
        .context("Index snapshot does not match the configured embedder")?;
    Ok(RetrievalEngine::new(index, corpus))
}

#[cfg(not(feature = "hnsw-index"))]
fn neighbor_index(flat: FlatIndex) -> Result<Arc<dyn NeighborIndex>> {
    Ok(Arc::new(flat))
}

#[cfg(feature = "hnsw-index")]
fn neighbor_index(flat: FlatIndex) -> Result<Arc<dyn NeighborIndex>> {
    let hnsw = memory::HnswIndex::from_flat(&flat, memory::HnswConfig::default())
        .context("Failed to build HNSW index")?;
    Ok(Arc::new(hnsw))
}

/// Модель-заглушка для команд, которым генерация не нужна
struct MissingKeyModel;

#[async_trait]
impl GenerativeModel for MissingKeyModel {
    async fn generate_content(&self, _model: &str, _prompt: &str) -> Result<ModelResponse, ModelError> {
        Err(ModelError::Other(
            "GEMINI_API_KEY is not set (env, .env or config file)".to_string(),
        ))
    }
}

/// Генератор с ретраями из настроек. Без `require_key` отсутствующий
/// ключ не ошибка: генерация тогда завершается `Unknown` без сетевых вызовов.
pub fn build_generator(config: &AppConfig, require_key: bool) -> Result<ResilientGenerator> {
    let settings = &config.generation;

    let model: Arc<dyn GenerativeModel> = match settings.require_api_key() {
        Ok(api_key) => Arc::new(
            GoogleProvider::with_timeout(
                api_key,
                Duration::from_secs(settings.request_timeout_secs),
            )?
            .with_base_url(settings.base_url.clone()),
        ),
        Err(e) if require_key => return Err(e),
        Err(_) => Arc::new(MissingKeyModel),
    };

    Ok(ResilientGenerator::new(
        model,
        settings.model.clone(),
        retry_config(config),
    ))
}

pub fn retry_config(config: &AppConfig) -> RetryConfig {
    let settings = &config.generation;
    let retry = RetryConfig::default()
        .with_max_attempts(settings.max_attempts)
        .with_initial_delay(Duration::from_millis(settings.initial_delay_ms));
    match settings.max_delay_ms {
        Some(max_delay_ms) => retry.with_max_delay(Duration::from_millis(max_delay_ms)),
        None => retry,
    }
}

/// Что нужно команде: поиск (корпус + индекс) и/или генерация (API ключ)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stages {
    /// `search`: генерация не нужна, ключ не обязателен
    Search,
    /// `suggest`: только генерация, корпус не загружается
    Suggest,
    /// `analyze`: оба шага
    Both,
}

impl Stages {
    fn needs_corpus(self) -> bool {
        matches!(self, Stages::Search | Stages::Both)
    }

    fn needs_api_key(self) -> bool {
        matches!(self, Stages::Suggest | Stages::Both)
    }
}

pub async fn build_service(config: &AppConfig, stages: Stages) -> Result<Arc<AnalysisService>> {
    let generator = build_generator(config, stages.needs_api_key())?;
    let service = if stages.needs_corpus() {
        AnalysisService::new(build_retrieval(config).await?, generator)
    } else {
        AnalysisService::generation_only(generator)
    };
    Ok(Arc::new(service))
}

pub async fn build_handlers(config: &AppConfig, stages: Stages) -> Result<ApiHandlers> {
    let service = build_service(config, stages).await?;
    Ok(ApiHandlers::new(service, config.retrieval.top_k))
}
