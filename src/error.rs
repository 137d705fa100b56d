use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while classifying or aggregating readiness data.
///
/// `InvalidInput` and `InsufficientData` are recoverable: callers render an
/// empty state instead of failing the whole view.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed thresholds: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ReadinessError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        ReadinessError::InvalidInput {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadinessError>;
