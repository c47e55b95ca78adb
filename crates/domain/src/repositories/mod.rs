//! Repository Abstractions - Ports for Infrastructure Layer
//!
//! Определяет contracts между Domain и Infrastructure слоями

mod corpus_store;

pub use corpus_store::CorpusStore;
