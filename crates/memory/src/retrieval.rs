//! RetrievalEngine: text query -> ranked patent records

use crate::embedding_index::EmbeddingIndex;
use crate::vector_index::Neighbor;
use domain::{CorpusStore, DomainError, DomainResult, RetrievalResult, ScoredPatent};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Находит ближайшие патенты для текстового запроса.
///
/// Индекс и корпус разделяются между запросами через `Arc` и не
/// изменяются после загрузки, поэтому на пути чтения нет блокировок.
#[derive(Clone)]
pub struct RetrievalEngine {
    index: EmbeddingIndex,
    corpus: Arc<dyn CorpusStore>,
}

impl RetrievalEngine {
    pub fn new(index: EmbeddingIndex, corpus: Arc<dyn CorpusStore>) -> Self {
        if index.len() != corpus.len() {
            warn!(
                index_rows = index.len(),
                corpus_rows = corpus.len(),
                "Index and corpus sizes differ"
            );
        }
        Self { index, corpus }
    }

    pub fn corpus_size(&self) -> usize {
        self.corpus.len()
    }

    /// Up to `k` records closest to `query`, most similar first.
    ///
    /// Returns `min(k, corpus_size)` records when the index is healthy.
    /// Rows the index reports but the corpus does not hold are dropped and
    /// the result is flagged partial.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(&self, query: &str, k: usize) -> DomainResult<RetrievalResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::invalid_input("query must not be empty"));
        }
        if k == 0 {
            return Err(DomainError::invalid_input("k must be at least 1"));
        }

        let wanted = k.min(self.corpus.len());
        if wanted == 0 {
            debug!("Corpus is empty, nothing to retrieve");
            return Ok(RetrievalResult::default());
        }

        let start = Instant::now();
        let mut neighbors = self.index.nearest(query, wanted).await?;
        neighbors.sort_by(Neighbor::rank_cmp);

        let mut seen = HashSet::with_capacity(neighbors.len());
        let mut hits = Vec::with_capacity(wanted);
        let mut dropped = Vec::new();

        for neighbor in neighbors {
            if hits.len() == wanted {
                break;
            }
            if !seen.insert(neighbor.row_id) {
                continue;
            }
            match self.corpus.get(neighbor.row_id) {
                Some(record) => hits.push(ScoredPatent {
                    record,
                    distance: neighbor.distance,
                }),
                None => dropped.push(neighbor.row_id),
            }
        }

        let partial = !dropped.is_empty();
        if partial {
            warn!(
                dropped = ?dropped,
                corpus_size = self.corpus.len(),
                "Index returned rows outside the corpus; result is partial"
            );
        }

        debug!(
            hits = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Retrieval completed"
        );
        Ok(RetrievalResult::new(hits, partial))
    }
}
