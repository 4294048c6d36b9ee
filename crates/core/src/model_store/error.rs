use thiserror::Error;

/// Errors raised by model store backends.
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("Model store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model store backend error: {0}")]
    Backend(String),
}

/// Result type for model store operations.
pub type Result<T> = std::result::Result<T, ModelStoreError>;
