//! Dataset and cache errors

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while building, registering or evicting datasets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// Id is empty, whitespace only, or contains the field separator
    #[error("Invalid dataset id: '{0}'")]
    InvalidId(String),

    /// A dataset with this id is already registered
    #[error("Dataset already exists: {0}")]
    AlreadyExists(String),

    /// No dataset with this id is registered
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// Every supplied entry was rejected by the kind's field vocabulary
    #[error("Dataset '{0}' contains no valid entries")]
    NoValidEntries(String),
}

impl DatasetError {
    /// Stable string code for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            DatasetError::InvalidId(_) => "INSIGHT_DATASET_INVALID_ID",
            DatasetError::AlreadyExists(_) => "INSIGHT_DATASET_EXISTS",
            DatasetError::NotFound(_) => "INSIGHT_DATASET_NOT_FOUND",
            DatasetError::NoValidEntries(_) => "INSIGHT_DATASET_EMPTY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::NotFound("courses".into());
        assert_eq!(err.to_string(), "Dataset not found: courses");
        assert_eq!(err.code(), "INSIGHT_DATASET_NOT_FOUND");
    }
}
