//! Embedding backends and the provider factory.

mod cache;
mod ollama;
mod openai;
mod traits;

pub use cache::CachedEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{Embedder, EmbeddingError};

use papier_core::config::{EmbeddingConfig, OllamaConfig};

/// Create the configured embedding backend, wrapped in the LRU cache
/// unless caching is disabled with `EMBEDDING_CACHE_SIZE=0`.
pub fn create_embedder(
    embedding: &EmbeddingConfig,
    ollama: &OllamaConfig,
) -> Result<Box<dyn Embedder>, EmbeddingError> {
    let inner: Box<dyn Embedder> = match embedding.provider.as_str() {
        "openai" => {
            let api_key = embedding
                .api_key
                .as_ref()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Box::new(OpenAiEmbedder::new(
                api_key.clone(),
                embedding.model.clone(),
                &embedding.base_url,
                embedding.dimensions,
            ))
        }
        "ollama" => Box::new(OllamaEmbedder::new(
            ollama.url.clone(),
            ollama.embedding_model.clone(),
            embedding.dimensions,
        )),
        other => {
            return Err(EmbeddingError::NotConfigured(format!(
                "unknown embedding provider: '{other}'"
            )))
        }
    };

    if embedding.cache_size > 0 {
        Ok(Box::new(CachedEmbedder::new(inner, embedding.cache_size)))
    } else {
        Ok(inner)
    }
}
