//! Vector storage and document bookkeeping.

pub mod error;
pub mod registry;
pub mod vector;

pub use error::StoreError;
pub use registry::DocumentRegistry;
pub use vector::{create_vector_store, InMemoryVectorStore, ScoredChunk, StoredChunk, VectorStore};
