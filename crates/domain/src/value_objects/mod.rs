//! Domain Value Objects - Immutable domain concepts
//!
//! Value objects представляют business concepts без identity.

mod generation_outcome;

pub use generation_outcome::{FailureKind, GenerationOutcome};
