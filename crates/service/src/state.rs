use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use papier_core::Config;
use papier_ingest::{
    create_embedder, Cl100kTokenizer, ChunkerConfig, Embedder, TextChunker, TokenCounter,
};
use papier_llm::Answerer;
use papier_store::{create_vector_store, DocumentRegistry, VectorStore};

use crate::error::ServiceError;

/// Everything the pipelines share: configuration plus the chunker, embedder,
/// vector store, answerer, and document bookkeeping.
pub struct AppState {
    pub config: Config,
    pub chunker: TextChunker,
    pub embedder: Box<dyn Embedder>,
    pub vector_store: Box<dyn VectorStore>,
    /// None when no LLM provider is configured; `ask` reports it then.
    pub answerer: Option<Answerer>,
    pub registry: RwLock<DocumentRegistry>,
}

impl AppState {
    /// Wire up all collaborators from config. The embedder and vector store
    /// are required for every pipeline; a missing LLM provider only disables
    /// answering, ingestion still works.
    pub fn from_config(config: Config) -> Result<Self, ServiceError> {
        let tokenizer: Arc<dyn TokenCounter> = Arc::new(Cl100kTokenizer);
        let chunker = TextChunker::new(
            ChunkerConfig {
                chunk_size: config.chunking.chunk_size,
                chunk_overlap: config.chunking.chunk_overlap,
            },
            tokenizer,
        )?;

        let embedder = create_embedder(&config.embedding, &config.ollama)?;
        let vector_store = create_vector_store(&config.store, config.embedding.dimensions)?;

        let answerer = match Answerer::from_config(&config.llm, &config.ollama) {
            Ok(answerer) => Some(answerer),
            Err(e) => {
                warn!(error = %e, "LLM provider unavailable, queries disabled");
                None
            }
        };

        Ok(Self {
            config,
            chunker,
            embedder,
            vector_store,
            answerer,
            registry: RwLock::new(DocumentRegistry::new()),
        })
    }
}
