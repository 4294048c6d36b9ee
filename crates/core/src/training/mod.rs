//! Training job lifecycle types.

mod error;
mod http_mapping;
mod types;

pub use error::{Result, TrainingError};
pub use http_mapping::training_error_to_status_code;
pub use types::{TrainingJob, TrainingState, TrainingTicket};
