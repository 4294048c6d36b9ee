//! Pure function for mapping training errors to HTTP status codes.

use super::TrainingError;

/// Maps a [`TrainingError`] to an HTTP status code.
///
/// Request-boundary errors are the caller's fault; everything else happens
/// inside the job and only reaches HTTP through the status endpoint.
pub fn training_error_to_status_code(error: &TrainingError) -> u16 {
    match error {
        TrainingError::InvalidCategory(_) => 400,
        TrainingError::InsufficientData { .. } => 400,
        TrainingError::Upstream(_) => 502,
        TrainingError::Persistence(_) => 500,
        TrainingError::Timeout(_) => 504,
    }
}
