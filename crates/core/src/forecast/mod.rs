mod codec;
mod error;
mod holt;
mod report;
mod request;
mod traits;
mod types;

pub use codec::{decode_model, encode_model};
pub use error::{ForecastError, Result};
pub use holt::HoltLinearEngine;
pub use report::{join_actuals, ForecastReport, ForecastRow, FORECAST_COLUMNS};
pub use request::{
    forecast_service_error_to_status_code, validate_horizon, ForecastServiceError,
    DEFAULT_HORIZON, MAX_HORIZON,
};
pub use traits::ForecastEngine;
pub use types::{FittedValue, ForecastModel, ForecastPoint, MIN_SERIES_LEN};
