//! Domain Entities - Core business objects
//!
//! Entities независимы от infrastructure concerns.

pub mod patent_record;
mod retrieval_result;

pub use patent_record::PatentRecord;
pub use retrieval_result::{RetrievalResult, ScoredPatent};
