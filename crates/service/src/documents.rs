//! Document ingestion pipeline: extract, chunk, embed, index.

use papier_core::{ChunkRecord, Document, DocumentId, FileType};
use papier_ingest::{extract_text, ExtractionError};
use papier_store::StoredChunk;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::state::AppState;

/// Chunks per embedding request. Keeps large documents under provider
/// request limits without a round trip per chunk.
pub const EMBED_BATCH_SIZE: usize = 64;

const NO_CONTENT_MESSAGE: &str = "no text content could be extracted";

/// What ingestion hands back once a document is fully indexed.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub document_id: DocumentId,
    pub filename: String,
    pub file_type: FileType,
    pub chunk_count: usize,
    pub total_tokens: usize,
}

/// A document plus its chunk records, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentDetail {
    pub document: Document,
    pub chunks: Vec<ChunkRecord>,
}

/// Run the full pipeline on one uploaded file.
///
/// Size and extension problems reject the upload before anything is
/// registered. From registration on, failures mark the document Failed in
/// the registry with their reason and then propagate, so the document list
/// shows what went wrong.
pub async fn ingest_document(
    state: &AppState,
    filename: &str,
    bytes: &[u8],
) -> Result<IngestReceipt, ServiceError> {
    let limit = state.config.ingest.max_file_bytes;
    if bytes.len() as u64 > limit {
        return Err(ServiceError::FileTooLarge {
            size: bytes.len() as u64,
            limit,
        });
    }

    let file_type = FileType::from_filename(filename).ok_or_else(|| {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        ExtractionError::UnsupportedType(ext)
    })?;

    let document = Document::new(filename, file_type, bytes.len() as u64);
    let document_id = document.id;
    state.registry.write().await.insert(document);

    let extracted = match extract_text(bytes, filename) {
        Ok(extracted) => extracted,
        Err(e) => {
            let reason = e.to_string();
            state.registry.write().await.mark_failed(document_id, &reason);
            return Err(e.into());
        }
    };

    if extracted.is_empty() {
        state
            .registry
            .write()
            .await
            .mark_failed(document_id, NO_CONTENT_MESSAGE);
        return Err(ServiceError::NoContent);
    }

    let chunks = state.chunker.chunk(&extracted.text);
    if chunks.is_empty() {
        state
            .registry
            .write()
            .await
            .mark_failed(document_id, NO_CONTENT_MESSAGE);
        return Err(ServiceError::NoContent);
    }
    debug!(
        filename,
        chunks = chunks.len(),
        chars = extracted.char_count(),
        "document chunked"
    );

    // Embed in batches to keep large documents inside provider limits.
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    let batch_count = texts.len().div_ceil(EMBED_BATCH_SIZE);
    for (i, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
        debug!("embedding batch {}/{} ({} chunks)", i + 1, batch_count, batch.len());
        match state.embedder.embed_batch(batch).await {
            Ok(batch_embeddings) => embeddings.extend(batch_embeddings),
            Err(e) => {
                let reason = format!("embedding failed (batch {}): {e}", i + 1);
                state.registry.write().await.mark_failed(document_id, &reason);
                return Err(e.into());
            }
        }
    }
    if embeddings.len() != chunks.len() {
        let reason = format!(
            "embedding count mismatch: {} chunks, {} vectors",
            chunks.len(),
            embeddings.len()
        );
        state.registry.write().await.mark_failed(document_id, &reason);
        return Err(ServiceError::Embedding(
            papier_ingest::EmbeddingError::Api(reason),
        ));
    }

    let records: Vec<ChunkRecord> = chunks
        .iter()
        .map(|chunk| ChunkRecord {
            id: Uuid::new_v4(),
            document_id,
            chunk_index: chunk.index,
            text: chunk.text.clone(),
            token_count: chunk.token_count,
        })
        .collect();

    let stored: Vec<StoredChunk> = records
        .iter()
        .zip(embeddings)
        .map(|(record, embedding)| StoredChunk {
            id: record.id,
            document_id,
            chunk_index: record.chunk_index,
            text: record.text.clone(),
            embedding,
        })
        .collect();

    if let Err(e) = state.vector_store.add_chunks(stored).await {
        let reason = e.to_string();
        state.registry.write().await.mark_failed(document_id, &reason);
        return Err(e.into());
    }

    let chunk_count = records.len();
    let total_tokens = records.iter().map(|r| r.token_count).sum();
    state
        .registry
        .write()
        .await
        .mark_completed(document_id, extracted.char_count(), records);

    info!(
        "Ingested '{}' ({}): {} chunks, {} tokens",
        filename, file_type, chunk_count, total_tokens
    );

    Ok(IngestReceipt {
        document_id,
        filename: filename.to_string(),
        file_type,
        chunk_count,
        total_tokens,
    })
}

/// All known documents, newest first, including failed ones.
pub async fn list_documents(state: &AppState) -> Vec<Document> {
    state
        .registry
        .read()
        .await
        .list()
        .into_iter()
        .cloned()
        .collect()
}

/// One document with its chunk records in emission order.
pub async fn get_document(
    state: &AppState,
    id: DocumentId,
) -> Result<DocumentDetail, ServiceError> {
    let registry = state.registry.read().await;
    let document = registry
        .get(&id)
        .cloned()
        .ok_or(ServiceError::DocumentNotFound(id))?;
    let chunks = registry.chunks_for(&id).map(<[_]>::to_vec).unwrap_or_default();
    Ok(DocumentDetail { document, chunks })
}

/// Remove a document from the vector store and the registry. Returns how
/// many vectors went away.
pub async fn delete_document(state: &AppState, id: DocumentId) -> Result<usize, ServiceError> {
    if state.registry.read().await.get(&id).is_none() {
        return Err(ServiceError::DocumentNotFound(id));
    }

    let removed = state.vector_store.delete_by_document(id).await?;
    state.registry.write().await.remove(&id);

    info!("Deleted document {id}: {removed} vectors removed");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use papier_core::{Config, DocumentStatus};
    use papier_ingest::{
        ChunkerConfig, Embedder, EmbeddingError, TextChunker, TokenCounter,
    };
    use papier_store::{DocumentRegistry, InMemoryVectorStore};
    use tokio::sync::RwLock;

    const DIMS: usize = 4;

    struct WordTokenizer;

    impl TokenCounter for WordTokenizer {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    type BatchLog = Arc<Mutex<Vec<usize>>>;

    /// Deterministic fake: each vector encodes the text length; batch sizes
    /// are recorded so tests can assert the batching behavior.
    struct FakeEmbedder {
        batches: BatchLog,
        fail: bool,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if self.fail {
                return Err(EmbeddingError::Api("backend down".into()));
            }
            self.batches.lock().unwrap().push(texts.len());
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.0, 0.0])
                .collect())
        }

        fn dimensions(&self) -> usize {
            DIMS
        }
    }

    fn test_state(chunk_size: usize, chunk_overlap: usize, fail_embedder: bool) -> (AppState, BatchLog) {
        let batches: BatchLog = Arc::default();
        let mut config = Config::for_profile("");
        config.ingest.max_file_bytes = 64 * 1024;

        let state = AppState {
            config,
            chunker: TextChunker::new(
                ChunkerConfig {
                    chunk_size,
                    chunk_overlap,
                },
                Arc::new(WordTokenizer),
            )
            .unwrap(),
            embedder: Box::new(FakeEmbedder {
                batches: batches.clone(),
                fail: fail_embedder,
            }),
            vector_store: Box::new(InMemoryVectorStore::new(DIMS)),
            answerer: None,
            registry: RwLock::new(DocumentRegistry::new()),
        };
        (state, batches)
    }

    #[tokio::test]
    async fn ingest_txt_end_to_end() {
        let (state, _) = test_state(6, 0, false);
        let text = "Alpha one two. Beta three four. Gamma five six. Delta seven eight.";

        let receipt = ingest_document(&state, "notes.txt", text.as_bytes())
            .await
            .unwrap();

        assert_eq!(receipt.filename, "notes.txt");
        assert_eq!(receipt.file_type, FileType::Txt);
        // 3-token sentences against a 6-token budget pack two per chunk.
        assert_eq!(receipt.chunk_count, 2);
        assert_eq!(receipt.total_tokens, 12);

        let registry = state.registry.read().await;
        let document = registry.get(&receipt.document_id).unwrap();
        assert_eq!(document.status, DocumentStatus::Completed);
        assert_eq!(document.chunk_count, receipt.chunk_count);
        assert_eq!(document.extracted_chars, text.chars().count());

        let records = registry.chunks_for(&receipt.document_id).unwrap();
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.chunk_index, i);
            assert!(!record.text.trim().is_empty());
        }
        drop(registry);

        assert_eq!(state.vector_store.chunk_count().await, receipt.chunk_count);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_before_registration() {
        let (state, _) = test_state(500, 50, false);
        let bytes = vec![b'x'; 128 * 1024];

        let err = ingest_document(&state, "big.txt", &bytes).await.unwrap_err();
        assert!(matches!(err, ServiceError::FileTooLarge { .. }));
        assert!(state.registry.read().await.is_empty());
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_registration() {
        let (state, _) = test_state(500, 50, false);

        let err = ingest_document(&state, "data.csv", b"a,b,c").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Extraction(ExtractionError::UnsupportedType(_))
        ));
        assert!(state.registry.read().await.is_empty());
    }

    #[tokio::test]
    async fn blank_document_is_marked_failed() {
        let (state, _) = test_state(500, 50, false);

        let err = ingest_document(&state, "empty.txt", b"   \n\n\t  ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoContent));

        let registry = state.registry.read().await;
        let documents = registry.list();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].status, DocumentStatus::Failed);
        assert_eq!(
            documents[0].error_message.as_deref(),
            Some("no text content could be extracted")
        );
    }

    #[tokio::test]
    async fn embedding_failure_marks_document_failed() {
        let (state, _) = test_state(500, 50, true);

        let err = ingest_document(&state, "doc.txt", b"Some real content here.")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Embedding(_)));

        let registry = state.registry.read().await;
        let documents = registry.list();
        assert_eq!(documents[0].status, DocumentStatus::Failed);
        assert!(documents[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("backend down"));
        drop(registry);

        assert_eq!(state.vector_store.chunk_count().await, 0);
    }

    #[tokio::test]
    async fn large_documents_embed_in_batches() {
        // One single-word sentence per chunk: 150 chunks, so three batches.
        let (state, batches) = test_state(1, 0, false);
        let text: String = (0..150)
            .map(|i| format!("w{i}."))
            .collect::<Vec<_>>()
            .join(" ");

        let receipt = ingest_document(&state, "long.txt", text.as_bytes())
            .await
            .unwrap();

        assert_eq!(receipt.chunk_count, 150);
        assert_eq!(*batches.lock().unwrap(), vec![64, 64, 22]);
        assert_eq!(state.vector_store.chunk_count().await, 150);
    }

    #[tokio::test]
    async fn get_document_returns_chunks_in_order() {
        let (state, _) = test_state(4, 0, false);
        let receipt = ingest_document(
            &state,
            "ordered.txt",
            b"First sentence here. Second sentence here. Third sentence here.",
        )
        .await
        .unwrap();

        let detail = get_document(&state, receipt.document_id).await.unwrap();
        assert_eq!(detail.document.id, receipt.document_id);
        assert_eq!(detail.chunks.len(), receipt.chunk_count);
        let indices: Vec<usize> = detail.chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, (0..receipt.chunk_count).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn get_unknown_document_is_not_found() {
        let (state, _) = test_state(500, 50, false);
        let err = get_document(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_registry_entry_and_vectors() {
        let (state, _) = test_state(4, 0, false);
        let receipt = ingest_document(
            &state,
            "victim.txt",
            b"Sentence one here. Sentence two here.",
        )
        .await
        .unwrap();

        let removed = delete_document(&state, receipt.document_id).await.unwrap();
        assert_eq!(removed, receipt.chunk_count);
        assert!(state.registry.read().await.is_empty());
        assert_eq!(state.vector_store.chunk_count().await, 0);

        let err = delete_document(&state, receipt.document_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_includes_failures() {
        let (state, _) = test_state(500, 50, false);
        ingest_document(&state, "first.txt", b"Oldest document content.")
            .await
            .unwrap();
        ingest_document(&state, "blank.txt", b"   ").await.unwrap_err();
        ingest_document(&state, "second.txt", b"Newest document content.")
            .await
            .unwrap();

        let documents = list_documents(&state).await;
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].filename, "second.txt");
        assert_eq!(documents[2].filename, "first.txt");
        assert!(documents.iter().any(|d| d.status == DocumentStatus::Failed));
    }
}
