//! CLI-specific error types
//!
//! CLI errors end the process with a non-zero exit code. Query rejections are
//! not CLI errors; they are written as error responses.

use std::fmt;
use std::io;

use crate::dataset::DatasetError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// A configured dataset snapshot could not be loaded
    DatasetLoadError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "INSIGHT_CLI_CONFIG_ERROR",
            Self::IoError => "INSIGHT_CLI_IO_ERROR",
            Self::DatasetLoadError => "INSIGHT_CLI_DATASET_LOAD_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Dataset snapshot load error
    pub fn dataset_load_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DatasetLoadError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DatasetError> for CliError {
    fn from(e: DatasetError) -> Self {
        Self::dataset_load_error(format!("{} ({})", e, e.code()))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::config_error("missing datasets");
        assert_eq!(err.to_string(), "INSIGHT_CLI_CONFIG_ERROR: missing datasets");
    }

    #[test]
    fn test_from_dataset_error() {
        let err = CliError::from(DatasetError::AlreadyExists("rooms".into()));
        assert_eq!(err.code(), &CliErrorCode::DatasetLoadError);
        assert!(err.message().contains("INSIGHT_DATASET_EXISTS"));
    }
}
