//! RetrievalResult - ranked prior art for one query

use super::PatentRecord;
use crate::{Distance, RowId};
use serde::{Deserialize, Serialize};

/// A corpus record together with its distance to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPatent {
    pub record: PatentRecord,
    /// Lower is more similar; only meaningful as a comparable key
    pub distance: Distance,
}

impl ScoredPatent {
    pub fn row_id(&self) -> Option<RowId> {
        self.record.row_id
    }
}

/// Ordered result of a nearest-neighbour retrieval.
///
/// Invariants (upheld by the retrieval engine): most similar first, ties
/// broken by ascending row id, no duplicate row ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredPatent>,
    /// Set when the index returned rows that do not exist in the corpus
    partial: bool,
}

impl RetrievalResult {
    pub fn new(hits: Vec<ScoredPatent>, partial: bool) -> Self {
        Self { hits, partial }
    }

    pub fn hits(&self) -> &[ScoredPatent] {
        &self.hits
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredPatent> {
        self.hits.iter()
    }

    /// Records only, in rank order
    pub fn records(&self) -> Vec<PatentRecord> {
        self.hits.iter().map(|hit| hit.record.clone()).collect()
    }

    pub fn into_records(self) -> Vec<PatentRecord> {
        self.hits.into_iter().map(|hit| hit.record).collect()
    }

    pub fn distances(&self) -> Vec<Distance> {
        self.hits.iter().map(|hit| hit.distance).collect()
    }
}

impl IntoIterator for RetrievalResult {
    type Item = ScoredPatent;
    type IntoIter = std::vec::IntoIter<ScoredPatent>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}
