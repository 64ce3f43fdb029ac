//! Pipeline orchestration: document ingestion, retrieval, and answering.

pub mod documents;
pub mod error;
pub mod query;
pub mod state;

pub use documents::{
    delete_document, get_document, ingest_document, list_documents, DocumentDetail, IngestReceipt,
};
pub use error::ServiceError;
pub use query::{ask, QueryResponse};
pub use state::AppState;
