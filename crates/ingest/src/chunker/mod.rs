//! Token-aware text chunking.
//!
//! Turns one flat extracted text string into an ordered sequence of bounded,
//! overlapping chunks: sentence-greedy accumulation under a token budget,
//! backward overlap seeding between consecutive chunks, and word-level
//! subdivision for sentences that exceed the budget on their own.

mod engine;
mod segment;
mod types;

pub use engine::TextChunker;
pub use types::{Chunk, ChunkError, ChunkerConfig};
