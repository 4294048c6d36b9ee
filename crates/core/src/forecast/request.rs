//! Validation and errors for forecast requests.

use thiserror::Error;

use crate::sales::CategoryError;
use crate::storage::{repository_error_to_status_code, RepositoryError};

/// Horizon used when a request does not name one.
pub const DEFAULT_HORIZON: u32 = 3;

/// Longest accepted horizon, in months.
pub const MAX_HORIZON: u32 = 60;

/// Errors raised while serving a forecast.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastServiceError {
    #[error("Invalid category: {0}")]
    InvalidCategory(#[from] CategoryError),
    #[error("Horizon must be between 1 and 60 months, got {0}")]
    InvalidHorizon(u32),
    #[error("No data for category '{0}'")]
    NotFound(String),
    #[error("Not enough data to forecast '{category}': {months} months, need at least {required}")]
    InsufficientData {
        category: String,
        months: usize,
        required: usize,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Forecast failed: {0}")]
    Engine(String),
}

/// Checks `1 <= horizon <= MAX_HORIZON`.
pub fn validate_horizon(horizon: u32) -> Result<u32, ForecastServiceError> {
    if (1..=MAX_HORIZON).contains(&horizon) {
        Ok(horizon)
    } else {
        Err(ForecastServiceError::InvalidHorizon(horizon))
    }
}

/// Maps a [`ForecastServiceError`] to an HTTP status code.
pub fn forecast_service_error_to_status_code(error: &ForecastServiceError) -> u16 {
    match error {
        ForecastServiceError::InvalidCategory(_) => 400,
        ForecastServiceError::InvalidHorizon(_) => 422,
        ForecastServiceError::NotFound(_) => 404,
        ForecastServiceError::InsufficientData { .. } => 400,
        ForecastServiceError::Repository(err) => repository_error_to_status_code(err),
        ForecastServiceError::Engine(_) => 500,
    }
}
