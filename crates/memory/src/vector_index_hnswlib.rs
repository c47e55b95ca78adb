//! HNSW индекс на базе hnsw_rs (feature `hnsw-index`).
//!
//! Приближённый поиск для больших корпусов. Граф строится из уже
//! посчитанных векторов [`FlatIndex`], поэтому снапшот на диске один
//! и тот же для обоих индексов.

use crate::errors::{MemoryError, MemoryResult};
use crate::vector_index::{FlatIndex, Neighbor, NeighborIndex};
use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswConfig {
    /// Максимальное количество связей на узел (M)
    pub max_connections: usize,
    /// Размер списка кандидатов при построении
    pub ef_construction: usize,
    /// Размер списка кандидатов при поиске, не меньше k
    pub ef_search: usize,
    /// hnsw_rs допускает не больше 16 слоёв
    pub max_layers: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            max_connections: 16,
            ef_construction: 200,
            ef_search: 64,
            max_layers: 16,
        }
    }
}

#[derive(Debug, Default)]
pub struct HnswStats {
    pub total_searches: AtomicU64,
    pub total_search_time_us: AtomicU64,
}

impl HnswStats {
    fn record_search(&self, duration_us: u64) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
        self.total_search_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn avg_search_time_us(&self) -> f64 {
        let searches = self.total_searches.load(Ordering::Relaxed);
        if searches == 0 {
            0.0
        } else {
            self.total_search_time_us.load(Ordering::Relaxed) as f64 / searches as f64
        }
    }
}

pub struct HnswIndex {
    hnsw: Hnsw<'static, f32, DistL2>,
    config: HnswConfig,
    dimension: usize,
    len: usize,
    stats: HnswStats,
}

impl HnswIndex {
    /// Построить граф по всем строкам flat индекса (row id = data id)
    pub fn from_flat(flat: &FlatIndex, config: HnswConfig) -> MemoryResult<Self> {
        let start = Instant::now();
        let len = flat.len();
        if len == 0 {
            return Err(MemoryError::Index(
                "cannot build HNSW graph from an empty index".to_string(),
            ));
        }

        let max_layers = config.max_layers.clamp(1, 16);
        let hnsw: Hnsw<'static, f32, DistL2> = Hnsw::new(
            config.max_connections,
            len,
            max_layers,
            config.ef_construction,
            DistL2 {},
        );

        for row_id in 0..len {
            if let Some(vector) = flat.row(row_id) {
                hnsw.insert_slice((vector, row_id));
            }
        }

        info!(
            "HNSW graph built: {} rows, max_layers={}, took {:?}",
            len,
            max_layers,
            start.elapsed()
        );

        Ok(Self {
            hnsw,
            config,
            dimension: flat.dimension(),
            len,
            stats: HnswStats::default(),
        })
    }

    pub fn stats(&self) -> &HnswStats {
        &self.stats
    }
}

impl NeighborIndex for HnswIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.len
    }

    fn search(&self, query: &[f32], k: usize) -> MemoryResult<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let ef_search = self.config.ef_search.max(k);

        // DistL2 отдаёт евклидово расстояние, flat индекс - его квадрат
        let mut neighbors: Vec<Neighbor> = self
            .hnsw
            .search(query, k, ef_search)
            .into_iter()
            .map(|n| Neighbor::new(n.distance * n.distance, n.d_id))
            .collect();
        neighbors.sort_by(Neighbor::rank_cmp);

        let elapsed = start.elapsed();
        self.stats.record_search(elapsed.as_micros() as u64);
        debug!("HNSW search: k={}, found {} in {:?}", k, neighbors.len(), elapsed);

        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hnsw_matches_flat_on_small_corpus() {
        let rows: Vec<Vec<f32>> = (0..50)
            .map(|i| vec![i as f32, (i % 7) as f32, 1.0])
            .collect();
        let flat = FlatIndex::from_vectors(3, rows).unwrap();
        let hnsw = HnswIndex::from_flat(&flat, HnswConfig::default()).unwrap();

        let query = [10.2, 3.0, 1.0];
        let exact = flat.search(&query, 1).unwrap();
        let approx = hnsw.search(&query, 1).unwrap();

        assert_eq!(hnsw.len(), 50);
        assert_eq!(approx[0].row_id, exact[0].row_id);
        assert!((approx[0].distance - exact[0].distance).abs() < 1e-3);
        assert_eq!(hnsw.stats().total_searches.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_empty_flat_index_is_rejected() {
        let flat = FlatIndex::new(4);
        assert!(HnswIndex::from_flat(&flat, HnswConfig::default()).is_err());
    }
}
