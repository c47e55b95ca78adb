//! Embedding function + neighbour index behind one query interface

use crate::embedding::Embedder;
use crate::errors::{MemoryError, MemoryResult};
use crate::vector_index::{Neighbor, NeighborIndex};
use std::sync::Arc;
use tracing::debug;

/// Answers "which corpus rows are closest to this text".
///
/// Shared read-only between requests; cloning is cheap.
#[derive(Clone)]
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn NeighborIndex>,
}

impl EmbeddingIndex {
    /// Fails when the embedder and the index disagree on dimension
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn NeighborIndex>) -> MemoryResult<Self> {
        if embedder.dimension() != index.dimension() {
            return Err(MemoryError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            });
        }
        Ok(Self { embedder, index })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub async fn nearest(&self, text: &str, k: usize) -> MemoryResult<Vec<Neighbor>> {
        let vector = self.embedder.embed(text).await?;
        let neighbors = self.index.search(&vector, k)?;
        debug!("Index returned {} neighbours for k={}", neighbors.len(), k);
        Ok(neighbors)
    }
}
