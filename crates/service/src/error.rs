use papier_core::DocumentId;
use papier_ingest::{ChunkError, EmbeddingError, ExtractionError};
use papier_llm::LlmError;
use papier_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the ingestion and query pipelines.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Extraction succeeded but yielded nothing to index. Distinct from a
    /// chunker failure: scanned PDFs and blank files land here.
    #[error("no text content could be extracted")]
    NoContent,

    #[error("chunking failed: {0}")]
    Chunking(#[from] ChunkError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("question must not be blank")]
    EmptyQuestion,

    #[error("question too long: {length} chars (limit {limit})")]
    QuestionTooLong { length: usize, limit: usize },

    #[error("no relevant documents found; upload documents first")]
    NoMatches,

    #[error("LLM provider '{0}' is not configured")]
    LlmNotConfigured(String),
}
