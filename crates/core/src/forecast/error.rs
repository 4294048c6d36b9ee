use thiserror::Error;

/// Errors raised by forecast engines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data: {points} monthly points, need at least {required}")]
    InsufficientData { points: usize, required: usize },
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Model encoding error: {0}")]
    Codec(String),
}

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let error = ForecastError::InsufficientData {
            points: 5,
            required: 6,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data: 5 monthly points, need at least 6"
        );
    }

    #[test]
    fn test_invalid_series_display() {
        let error = ForecastError::InvalidSeries("months out of order".to_string());
        assert_eq!(error.to_string(), "Invalid series: months out of order");
    }
}
