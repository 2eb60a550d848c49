//! Query error types
//!
//! Error codes:
//! - INSIGHT_QUERY_INVALID (REJECT): malformed WHERE/OPTIONS/TRANSFORMATIONS,
//!   unknown or mismatched keys, wrong value types, bad wildcards, duplicate
//!   apply names, unknown dataset
//! - INSIGHT_RESULT_TOO_LARGE (REJECT): valid query, too many result rows

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// The query is structurally or semantically invalid
    InsightQueryInvalid,
    /// The query is valid but produced more rows than allowed
    InsightResultTooLarge,
}

impl QueryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InsightQueryInvalid => "INSIGHT_QUERY_INVALID",
            QueryErrorCode::InsightResultTooLarge => "INSIGHT_RESULT_TOO_LARGE",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
    key: Option<String>,
}

impl QueryError {
    /// Create a query invalid error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InsightQueryInvalid,
            message: reason.into(),
            key: None,
        }
    }

    /// Create a query invalid error tied to one query key
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: QueryErrorCode::InsightQueryInvalid,
            message: format!("{}: '{}'", reason.into(), key),
            key: Some(key),
        }
    }

    /// Create a result too large error
    pub fn result_too_large(rows: usize, max_rows: usize) -> Self {
        Self {
            code: QueryErrorCode::InsightResultTooLarge,
            message: format!("Query produced {} rows, maximum is {}", rows, max_rows),
            key: None,
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending query key, if the error is tied to one
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_result_too_large(&self) -> bool {
        self.code == QueryErrorCode::InsightResultTooLarge
    }

    /// Both codes describe a bad request, never a server fault
    pub fn is_client_error(&self) -> bool {
        self.severity() == Severity::Reject
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryErrorCode::InsightQueryInvalid.code(),
            "INSIGHT_QUERY_INVALID"
        );
        assert_eq!(
            QueryErrorCode::InsightResultTooLarge.code(),
            "INSIGHT_RESULT_TOO_LARGE"
        );
    }

    #[test]
    fn test_too_large_is_distinct() {
        let err = QueryError::result_too_large(6000, 5000);
        assert!(err.is_result_too_large());
        assert!(err.is_client_error());
        assert!(!QueryError::invalid("bad").is_result_too_large());
    }

    #[test]
    fn test_error_display() {
        let err = QueryError::invalid_key("rooms_lat", "Mismatching dataset ids");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("INSIGHT_QUERY_INVALID"));
        assert!(display.contains("rooms_lat"));
        assert_eq!(err.key(), Some("rooms_lat"));
    }
}
