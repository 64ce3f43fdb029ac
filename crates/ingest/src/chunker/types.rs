//! Chunker configuration, output, and error types.

use thiserror::Error;

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the chunking engine.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum tokens per chunk (default: 500). Must be at least 1.
    pub chunk_size: usize,
    /// Token budget for trailing content carried into the next chunk
    /// (default: 50). Should stay below `chunk_size`; larger values are not
    /// rejected but re-seed most of each flushed chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkError> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// A zero chunk size cannot hold any content and is a caller bug.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 {
            return Err(ChunkError::InvalidChunkSize(self.chunk_size));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("chunk_size must be at least 1 token (got {0})")]
    InvalidChunkSize(usize),
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// One output chunk: space-joined fragments plus the exact token count of
/// that text under the sizing tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in emission order (the downstream chunk_index).
    pub index: usize,
    /// The chunk text content.
    pub text: String,
    /// Token count of `text`, recomputed on the joined text at emission.
    pub token_count: usize,
}
