mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    aggregate_key, forecast_key, monthly_series_key, static_key, SALES_DERIVED_PATTERNS,
};
pub use patterns::pattern_matches;
pub use serialization::{deserialize, serialize, SerializationError};
pub use traits::{Cache, DEFAULT_TTL};
