use crate::embedding::Embedder;
use crate::errors::{MemoryError, MemoryResult};
use domain::{Distance, PatentRecord, RowId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

/// Один результат поиска ближайших соседей
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub distance: Distance,
    pub row_id: RowId,
}

impl Neighbor {
    pub fn new(distance: Distance, row_id: RowId) -> Self {
        Self { distance, row_id }
    }

    /// Ranking order: ascending distance, then ascending row id.
    /// NaN of either sign ranks as `+inf`, i.e. after every real distance.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_key(self.distance)
            .total_cmp(&rank_key(other.distance))
            .then(self.row_id.cmp(&other.row_id))
    }
}

fn rank_key(distance: Distance) -> Distance {
    if distance.is_nan() {
        Distance::INFINITY
    } else {
        distance
    }
}

/// Nearest-neighbour index over corpus rows
pub trait NeighborIndex: Send + Sync {
    fn dimension(&self) -> usize;

    /// Number of indexed rows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` nearest rows, closest first
    fn search(&self, query: &[f32], k: usize) -> MemoryResult<Vec<Neighbor>>;
}

/// Точный (brute-force) индекс по квадрату L2 расстояния.
///
/// Векторы хранятся построчно в одном буфере; строка `i` соответствует
/// записи корпуса с `row_id == i`. Снапшот на диске - bincode от этой
/// структуры.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn from_vectors(dimension: usize, rows: Vec<Vec<f32>>) -> MemoryResult<Self> {
        let mut index = Self::new(dimension);
        index.vectors.reserve(dimension * rows.len());
        for row in rows {
            index.push(&row)?;
        }
        Ok(index)
    }

    /// Embed every record in corpus order
    pub async fn build(embedder: &dyn Embedder, records: &[PatentRecord]) -> MemoryResult<Self> {
        let mut index = Self::new(embedder.dimension());
        index.vectors.reserve(index.dimension * records.len());

        for record in records {
            let vector = embedder.embed(&record.embedding_text()).await?;
            index.push(&vector)?;
        }

        info!(
            "Built flat index: {} rows, dimension {}",
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    pub fn push(&mut self, vector: &[f32]) -> MemoryResult<RowId> {
        check_dimension(self.dimension, vector.len())?;
        let row_id = self.len();
        self.vectors.extend_from_slice(vector);
        Ok(row_id)
    }

    pub fn row(&self, row_id: RowId) -> Option<&[f32]> {
        let start = row_id.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> MemoryResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MemoryError::io(path, e))?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        debug!("Saved index snapshot to {}", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> MemoryResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MemoryError::io(path, e))?;
        let index: Self = bincode::deserialize_from(BufReader::new(file))?;

        if index.dimension == 0 || index.vectors.len() % index.dimension != 0 {
            return Err(MemoryError::Index(format!(
                "snapshot {} is truncated: {} values for dimension {}",
                path.display(),
                index.vectors.len(),
                index.dimension
            )));
        }

        info!(
            "Loaded index snapshot {}: {} rows, dimension {}",
            path.display(),
            index.len(),
            index.dimension
        );
        Ok(index)
    }
}

impl NeighborIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    fn search(&self, query: &[f32], k: usize) -> MemoryResult<Vec<Neighbor>> {
        check_dimension(self.dimension, query.len())?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row_id, row)| Neighbor::new(squared_l2(query, row), row_id))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, Neighbor::rank_cmp);
            scored.truncate(k);
        }
        scored.sort_by(Neighbor::rank_cmp);

        Ok(scored)
    }
}

fn check_dimension(expected: usize, actual: usize) -> MemoryResult<()> {
    if expected != actual {
        return Err(MemoryError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
