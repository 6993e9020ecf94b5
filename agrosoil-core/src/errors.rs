use crate::units::FloatValue;
use thiserror::Error;

/// Error type for invalid soil column operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoilError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid {quantity}: {value}. Expected a finite, non-negative value")]
    InvalidMagnitude {
        quantity: &'static str,
        value: FloatValue,
    },
    #[error("Invalid fertiliser partition: {reason}")]
    InvalidPartition { reason: String },
    #[error("Invalid texture in layer {layer}: sand={sand}, clay={clay}, stone={stone}. Fractions must lie in [0, 1] and sand + clay must not exceed 1")]
    InvalidTexture {
        layer: usize,
        sand: FloatValue,
        clay: FloatValue,
        stone: FloatValue,
    },
    #[error("Layer count mismatch: {thickness_count} layer thicknesses but {soil_count} soil parameter sets")]
    LayerCountMismatch {
        thickness_count: usize,
        soil_count: usize,
    },
    #[error("A soil column needs at least one layer")]
    EmptyProfile,
}

/// Convenience type for `Result<T, SoilError>`.
pub type SoilResult<T> = Result<T, SoilError>;

/// Reject negative and non-finite magnitudes before any state is touched.
pub fn ensure_non_negative(quantity: &'static str, value: FloatValue) -> SoilResult<FloatValue> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SoilError::InvalidMagnitude { quantity, value })
    }
}
