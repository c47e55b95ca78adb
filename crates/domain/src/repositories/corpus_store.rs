//! CorpusStore - read-only access to the patent corpus by position

use crate::entities::PatentRecord;
use crate::RowId;

/// Read-only store of patent records addressable by integer row id.
///
/// Implementations are loaded once and never mutated afterwards, so they
/// are shared between concurrent requests without locking.
pub trait CorpusStore: Send + Sync {
    /// Record at `row_id`, with `row_id` populated. `None` when out of bounds.
    fn get(&self, row_id: RowId) -> Option<PatentRecord>;

    /// Number of records in the corpus
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `row_id` addresses an existing record
    fn contains(&self, row_id: RowId) -> bool {
        row_id < self.len()
    }
}
