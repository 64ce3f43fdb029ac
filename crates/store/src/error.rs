use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("not configured: {0}")]
    NotConfigured(String),
}
