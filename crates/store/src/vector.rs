use async_trait::async_trait;
use papier_core::config::StoreConfig;
use papier_core::{ChunkId, DocumentId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::StoreError;

/// A chunk with its embedding, as held by a vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A chunk returned from a similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub text: String,
    pub similarity: f32,
}

/// Trait for vector search backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a batch of chunks with their embeddings.
    async fn add_chunks(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError>;

    /// The `top_k` chunks most similar to the query vector, best first.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Remove every chunk belonging to a document. Returns how many went away.
    async fn delete_by_document(&self, document_id: DocumentId) -> Result<usize, StoreError>;

    /// Total number of stored chunks.
    async fn chunk_count(&self) -> usize;
}

/// Create the configured vector store backend.
pub fn create_vector_store(
    store: &StoreConfig,
    dimensions: usize,
) -> Result<Box<dyn VectorStore>, StoreError> {
    match store.backend.as_str() {
        "memory" => {
            info!("Vector store: in-memory backend ({dimensions} dims)");
            Ok(Box::new(InMemoryVectorStore::new(dimensions)))
        }
        other => Err(StoreError::NotConfigured(format!(
            "unknown vector store backend: '{other}'"
        ))),
    }
}

/// Brute-force cosine search over everything in memory.
///
/// Fine for the corpus sizes this serves; a real deployment swaps in a
/// proper ANN backend behind the same trait.
pub struct InMemoryVectorStore {
    dimensions: usize,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            chunks: RwLock::new(Vec::new()),
        }
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), StoreError> {
        if vector.len() != self.dimensions {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_chunks(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError> {
        for chunk in &chunks {
            self.check_dimensions(&chunk.embedding)?;
        }
        self.chunks.write().await.extend(chunks);
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        self.check_dimensions(query)?;

        let chunks = self.chunks.read().await;
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                id: chunk.id,
                document_id: chunk.document_id,
                chunk_index: chunk.chunk_index,
                text: chunk.text.clone(),
                similarity: cosine_similarity(query, &chunk.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_document(&self, document_id: DocumentId) -> Result<usize, StoreError> {
        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|chunk| chunk.document_id != document_id);
        Ok(before - chunks.len())
    }

    async fn chunk_count(&self) -> usize {
        self.chunks.read().await.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0;
    let mut na = 0.0;
    let mut nb = 0.0;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        na += a[i] * a[i];
        nb += b[i] * b[i];
    }

    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }

    dot / (na.sqrt() * nb.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn stored(document_id: DocumentId, chunk_index: usize, text: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            id: Uuid::new_v4(),
            document_id,
            chunk_index,
            text: text.to_string(),
            embedding,
        }
    }

    #[tokio::test]
    async fn search_returns_best_match_first() {
        let store = InMemoryVectorStore::new(3);
        let doc = Uuid::new_v4();
        store
            .add_chunks(vec![
                stored(doc, 0, "about cats", vec![1.0, 0.0, 0.0]),
                stored(doc, 1, "about dogs", vec![0.0, 1.0, 0.0]),
                stored(doc, 2, "about fish", vec![0.0, 0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[0.9, 0.1, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "about cats");
        assert_eq!(results[1].text, "about dogs");
        assert!(results[0].similarity > results[1].similarity);
    }

    #[tokio::test]
    async fn identical_vector_scores_one() {
        let store = InMemoryVectorStore::new(2);
        let doc = Uuid::new_v4();
        store
            .add_chunks(vec![stored(doc, 0, "x", vec![0.6, 0.8])])
            .await
            .unwrap();

        let results = store.search(&[0.6, 0.8], 1).await.unwrap();
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_store_returns_no_results() {
        let store = InMemoryVectorStore::new(4);
        let results = store.search(&[1.0, 0.0, 0.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn top_k_larger_than_store_returns_everything() {
        let store = InMemoryVectorStore::new(2);
        let doc = Uuid::new_v4();
        store
            .add_chunks(vec![
                stored(doc, 0, "a", vec![1.0, 0.0]),
                stored(doc, 1, "b", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 1.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_wrong_dimensions() {
        let store = InMemoryVectorStore::new(3);
        let err = store
            .add_chunks(vec![stored(Uuid::new_v4(), 0, "short", vec![1.0, 2.0])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn search_rejects_wrong_dimensions() {
        let store = InMemoryVectorStore::new(3);
        let err = store.search(&[1.0], 5).await.unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn zero_vector_query_scores_zero_without_nan() {
        let store = InMemoryVectorStore::new(2);
        store
            .add_chunks(vec![stored(Uuid::new_v4(), 0, "x", vec![1.0, 0.0])])
            .await
            .unwrap();

        let results = store.search(&[0.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].similarity, 0.0);
    }

    #[tokio::test]
    async fn delete_by_document_removes_only_that_document() {
        let store = InMemoryVectorStore::new(2);
        let keep = Uuid::new_v4();
        let victim = Uuid::new_v4();
        store
            .add_chunks(vec![
                stored(keep, 0, "keep me", vec![1.0, 0.0]),
                stored(victim, 0, "drop me", vec![0.0, 1.0]),
                stored(victim, 1, "me too", vec![0.5, 0.5]),
            ])
            .await
            .unwrap();

        let removed = store.delete_by_document(victim).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.chunk_count().await, 1);

        let results = store.search(&[0.0, 1.0], 5).await.unwrap();
        assert!(results.iter().all(|r| r.document_id == keep));
    }

    #[tokio::test]
    async fn deleting_unknown_document_removes_nothing() {
        let store = InMemoryVectorStore::new(2);
        let removed = store.delete_by_document(Uuid::new_v4()).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn factory_builds_memory_backend() {
        let config = StoreConfig {
            backend: "memory".to_string(),
        };
        assert!(create_vector_store(&config, 1536).is_ok());
    }

    #[test]
    fn factory_rejects_unknown_backend() {
        let config = StoreConfig {
            backend: "qdrant".to_string(),
        };
        let err = create_vector_store(&config, 1536).err().unwrap();
        assert!(matches!(err, StoreError::NotConfigured(_)));
    }
}
