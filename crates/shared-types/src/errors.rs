//! Error types for the transformation store crates
//!
//! The public store surface never raises: malformed input is clamped or
//! absorbed. These variants exist for the fallible inner paths and the
//! JS boundary, so stricter validation can be surfaced later without
//! changing the store's external shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Dimension;

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum TransformError {
    #[error("Unknown dimension id: {id}")]
    UnknownDimension { id: String },

    #[error("Unknown interaction mode: {mode}")]
    UnknownMode { mode: String },

    #[error("Phase not found: {phase_id} in {dimension} dimension")]
    PhaseNotFound {
        dimension: Dimension,
        phase_id: String,
    },

    #[error("Data point not found: {id}")]
    DataPointNotFound { id: String },

    #[error("State validation failed: {errors:?}")]
    StateValidation {
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    #[error("Serialization error: {message}")]
    Serialize { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Result type alias for transformation store operations
pub type TransformResult<T> = Result<T, TransformError>;

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::Serialize {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = TransformError::PhaseNotFound {
            dimension: Dimension::Temporal,
            phase_id: "missing".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("PhaseNotFound"));
        assert!(json.contains("missing"));

        let back: TransformError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, error);
    }

    #[test]
    fn test_display_names_the_dimension() {
        let error = TransformError::PhaseNotFound {
            dimension: Dimension::Depth,
            phase_id: "core-values".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Phase not found: core-values in depth dimension"
        );
    }
}
