//! Encoding of trained models into the blobs kept by the model store.

use super::{ForecastError, ForecastModel, Result};

/// Encodes a model to bytes.
pub fn encode_model(model: &ForecastModel) -> Result<Vec<u8>> {
    serde_json::to_vec(model).map_err(|e| ForecastError::Codec(e.to_string()))
}

/// Decodes a model from bytes produced by [`encode_model`].
pub fn decode_model(bytes: &[u8]) -> Result<ForecastModel> {
    serde_json::from_slice(bytes).map_err(|e| ForecastError::Codec(e.to_string()))
}
