//! Retrieval stage: patent corpus, embeddings, nearest-neighbour index.
//!
//! - [`InMemoryCorpus`] - read-only corpus addressed by row id
//! - [`Embedder`] / [`HashingEmbedder`] - text to vector
//! - [`NeighborIndex`] / [`FlatIndex`] - exact squared-L2 search with bincode snapshots
//! - [`EmbeddingIndex`] - embedder + index behind one `nearest(text, k)` call
//! - [`RetrievalEngine`] - query to ranked [`domain::RetrievalResult`]

mod corpus;
mod embedding;
mod embedding_index;
mod errors;
mod retrieval;
mod vector_index;

#[cfg(feature = "hnsw-index")]
mod vector_index_hnswlib;

pub use corpus::InMemoryCorpus;
pub use embedding::{Embedder, HashingEmbedder};
pub use embedding_index::EmbeddingIndex;
pub use errors::{MemoryError, MemoryResult};
pub use retrieval::RetrievalEngine;
pub use vector_index::{squared_l2, FlatIndex, Neighbor, NeighborIndex};

#[cfg(feature = "hnsw-index")]
pub use vector_index_hnswlib::{HnswConfig, HnswIndex, HnswStats};
