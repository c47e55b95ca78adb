//! Domain Layer - PatentScope business objects
//!
//! Содержит ТОЛЬКО чистую business logic без dependencies на:
//! - Infrastructure (file systems, vector indexes, HTTP clients)
//! - Frameworks (CLI, transport)
//! - External systems (embedding models, hosted generative models)
//!
//! - Entities: PatentRecord, RetrievalResult
//! - Value Objects: GenerationOutcome, FailureKind
//! - Repository Abstractions: CorpusStore

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

pub use entities::{PatentRecord, RetrievalResult, ScoredPatent};
pub use errors::{DomainError, DomainResult};
pub use repositories::CorpusStore;
pub use value_objects::{FailureKind, GenerationOutcome};

/// Position of a record inside the corpus
pub type RowId = usize;
/// Distance reported by the nearest-neighbour index (lower = more similar)
pub type Distance = f32;
