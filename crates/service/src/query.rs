//! Question answering over the indexed corpus.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use papier_ingest::EmbeddingError;
use papier_store::ScoredChunk;

use crate::error::ServiceError;
use crate::state::AppState;

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;
/// Hard ceiling on retrieved chunks per query.
pub const MAX_TOP_K: usize = 20;

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub question: String,
    /// The retrieved chunks the answer was grounded in, best match first.
    pub chunks_used: Vec<ScoredChunk>,
    pub processing_time_ms: f64,
}

/// Answer a question against the indexed corpus: embed the question, fetch
/// the most similar chunks, and have the LLM answer from them.
pub async fn ask(
    state: &AppState,
    question: &str,
    top_k: Option<usize>,
) -> Result<QueryResponse, ServiceError> {
    let started = Instant::now();

    let question = question.trim();
    if question.is_empty() {
        return Err(ServiceError::EmptyQuestion);
    }
    let length = question.chars().count();
    if length > MAX_QUESTION_CHARS {
        return Err(ServiceError::QuestionTooLong {
            length,
            limit: MAX_QUESTION_CHARS,
        });
    }
    let top_k = top_k
        .unwrap_or(state.config.retrieval.top_k)
        .clamp(1, MAX_TOP_K);

    let answerer = state
        .answerer
        .as_ref()
        .ok_or_else(|| ServiceError::LlmNotConfigured(state.config.llm.provider.clone()))?;

    let embeddings = state.embedder.embed_batch(&[question]).await?;
    let query_embedding = embeddings.into_iter().next().ok_or_else(|| {
        ServiceError::Embedding(EmbeddingError::Api("no embedding returned for query".into()))
    })?;

    let mut chunks_used = state.vector_store.search(&query_embedding, top_k).await?;
    if chunks_used.is_empty() {
        return Err(ServiceError::NoMatches);
    }
    debug!(retrieved = chunks_used.len(), top_k, "retrieved context chunks");

    // Presentation rounding; ordering already happened on the raw scores.
    for chunk in &mut chunks_used {
        chunk.similarity = (chunk.similarity * 10_000.0).round() / 10_000.0;
    }

    let contexts: Vec<String> = chunks_used.iter().map(|c| c.text.clone()).collect();
    let answer = answerer.answer(question, &contexts).await?;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let processing_time_ms = (elapsed_ms * 100.0).round() / 100.0;
    info!(
        "Answered question using {} chunks in {:.2}ms",
        chunks_used.len(),
        processing_time_ms
    );

    Ok(QueryResponse {
        answer,
        question: question.to_string(),
        chunks_used,
        processing_time_ms,
    })
}
