//! Durable storage for one trained model per category.

mod error;
mod keys;
mod traits;

pub use error::{ModelStoreError, Result};
pub use keys::model_file_name;
pub use traits::ModelStore;
