//! Corpus file -> index snapshot -> retrieval, the way the CLI wires it

use domain::CorpusStore;
use memory::{
    Embedder, EmbeddingIndex, FlatIndex, HashingEmbedder, InMemoryCorpus, NeighborIndex,
    RetrievalEngine,
};
use std::fs;
use std::sync::Arc;

const CORPUS: &str = r#"[
    {"title": "Solar water kettle", "abstract": "A kettle heated by concentrated sunlight", "publication_number": "US1000001", "date": "2019-03-01"},
    {"title": "Folding bicycle frame", "abstract": "A bicycle frame hinged to fold in half", "publication_number": "US1000002", "date": "2020-07-15"},
    {"title": "Smart plant pot", "abstract": "A pot measuring soil moisture for houseplants", "publication_number": "US1000003", "date": "2021-11-30"}
]"#;

#[tokio::test]
async fn test_snapshot_round_trip_preserves_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("patents.json");
    let index_path = dir.path().join("patents.idx");
    fs::write(&corpus_path, CORPUS).unwrap();

    let corpus = Arc::new(InMemoryCorpus::load(&corpus_path).unwrap());
    assert_eq!(corpus.len(), 3);

    let embedder = Arc::new(HashingEmbedder::new(128));
    FlatIndex::build(embedder.as_ref(), corpus.records())
        .await
        .unwrap()
        .save(&index_path)
        .unwrap();

    let index = FlatIndex::load(&index_path).unwrap();
    assert_eq!(index.len(), corpus.len());
    assert_eq!(index.dimension(), embedder.dimension());

    let lookup = EmbeddingIndex::new(embedder, Arc::new(index)).unwrap();
    let engine = RetrievalEngine::new(lookup, corpus);

    let result = engine
        .retrieve("foldable bicycle frame with a hinge", 2)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.hits()[0].record.publication_number(),
        Some("US1000002")
    );
    assert_eq!(result.hits()[0].row_id(), Some(1));
}
