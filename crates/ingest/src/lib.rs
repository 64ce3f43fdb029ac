//! Document ingestion: extraction, token counting, chunking, embedding.

pub mod chunker;
pub mod document;
pub mod embedding;
pub mod tokenizer;

pub use chunker::{Chunk, ChunkError, ChunkerConfig, TextChunker};
pub use document::{extract_text, ExtractedDocument, ExtractionError};
pub use embedding::{create_embedder, Embedder, EmbeddingError};
pub use tokenizer::{Cl100kTokenizer, TokenCounter};
