//! Similarity search ordering and empty-collection behaviour

use proptest::prelude::*;
use uuid::Uuid;

use verirag::providers::{UpsertOptions, VectorStoreProvider};
use verirag::storage::SqliteVectorStore;
use verirag::types::{ChunkMetadata, EmbeddingRecord};

const DIMS: usize = 4;

fn record(i: usize, vector: Vec<f32>) -> EmbeddingRecord {
    EmbeddingRecord {
        id: Uuid::new_v4(),
        content: format!("passage {}", i),
        vector,
        metadata: ChunkMetadata {
            document_id: Uuid::nil(),
            title: "doc".to_string(),
            page_number: 1,
            chunk_index: i as u32,
            char_start: 0,
            char_end: 0,
        },
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn vector() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, DIMS)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn results_are_nearest_first(
        vectors in prop::collection::vec(vector(), 1..40),
        query in vector(),
        k in 1usize..10,
    ) {
        let rt = runtime();
        let store = SqliteVectorStore::in_memory(DIMS).unwrap();
        let records: Vec<_> = vectors.into_iter().enumerate().map(|(i, v)| record(i, v)).collect();

        let hits = rt.block_on(async {
            store.upsert("c", &records, UpsertOptions::default()).await.unwrap();
            store.similarity_search("c", &query, k).await.unwrap()
        });

        prop_assert_eq!(hits.len(), k.min(records.len()));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
            prop_assert!(pair[0].similarity() >= pair[1].similarity());
        }
    }
}

#[tokio::test]
async fn unknown_collection_is_empty_not_error() {
    let store = SqliteVectorStore::in_memory(DIMS).unwrap();
    store
        .upsert("populated", &[record(0, vec![1.0, 0.0, 0.0, 0.0])], UpsertOptions::default())
        .await
        .unwrap();

    let hits = store
        .similarity_search("rag_collection", &[1.0, 0.0, 0.0, 0.0], 3)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn zero_k_returns_nothing() {
    let store = SqliteVectorStore::in_memory(DIMS).unwrap();
    store
        .upsert("c", &[record(0, vec![1.0, 0.0, 0.0, 0.0])], UpsertOptions::default())
        .await
        .unwrap();

    assert!(store.similarity_search("c", &[1.0, 0.0, 0.0, 0.0], 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn ties_keep_insertion_order() {
    let store = SqliteVectorStore::in_memory(DIMS).unwrap();
    let records: Vec<_> = (0..5).map(|i| record(i, vec![1.0, 1.0, 0.0, 0.0])).collect();
    store.upsert("c", &records, UpsertOptions::default()).await.unwrap();

    let hits = store.similarity_search("c", &[1.0, 0.0, 0.0, 0.0], 5).await.unwrap();
    let order: Vec<_> = hits.iter().map(|h| h.record.metadata.chunk_index).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}
