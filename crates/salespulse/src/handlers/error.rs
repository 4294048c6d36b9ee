use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use salespulse_core::forecast::{forecast_service_error_to_status_code, ForecastServiceError};
use salespulse_core::sales::CategoryError;
use salespulse_core::storage::{repository_error_to_status_code, RepositoryError};
use salespulse_core::training::{training_error_to_status_code, TrainingError};

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<TrainingError>() {
            training_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<ForecastServiceError>() {
            forecast_service_error_to_status_code(err)
        } else if self.0.downcast_ref::<CategoryError>().is_some() {
            400
        } else {
            500
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<anyhow::Error>) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_known_errors_map_to_status_codes() {
        assert_eq!(status(RepositoryError::no_sales()), StatusCode::NOT_FOUND);
        assert_eq!(status(CategoryError::Empty), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(TrainingError::InsufficientData {
                category: "Books".into(),
                months: 2,
                required: 6
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ForecastServiceError::InvalidHorizon(0)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_unknown_error_is_internal() {
        assert_eq!(
            status(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
