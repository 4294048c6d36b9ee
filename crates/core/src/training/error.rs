use std::time::Duration;

use thiserror::Error;

use crate::sales::CategoryError;

/// Errors raised while requesting or running a training job.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error("Invalid category: {0}")]
    InvalidCategory(#[from] CategoryError),
    #[error("Insufficient data for '{category}': {months} months, need at least {required}")]
    InsufficientData {
        category: String,
        months: usize,
        required: usize,
    },
    /// The sales repository or the forecast engine failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),
    #[error("Failed to persist model: {0}")]
    Persistence(String),
    #[error("Training timed out after {0:?}")]
    Timeout(Duration),
}

impl TrainingError {
    /// Text carried by the `training_failed` event.
    pub fn event_message(&self) -> String {
        match self {
            Self::InsufficientData { .. } => "insufficient data".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for training operations.
pub type Result<T> = std::result::Result<T, TrainingError>;
