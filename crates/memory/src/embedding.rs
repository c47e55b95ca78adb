//! Embedding functions: text -> fixed-size vector

use crate::errors::MemoryResult;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Maps text to a vector of fixed dimension.
///
/// The same function must be used for building the index and for queries,
/// otherwise distances are meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>>;
}

/// Детерминированный feature-hashing эмбеддер.
///
/// Каждый токен (lowercase, буквы и цифры) хешируется SHA-256 в корзину
/// со знаком, вектор нормализуется по L2. Не требует модели и сети.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let slot = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}
