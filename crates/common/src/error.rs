//! Error types for survey-rs.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Permanent Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    /// A choice, question or link points outside of the survey it is used in.
    #[error("Scope mismatch: {0}")]
    ScopeMismatch(String),

    /// A question would be linked to itself.
    #[error("Self loop: {0}")]
    SelfLoop(String),

    /// The submitted answer is not for the question the respondent is currently on.
    #[error("Out of order: {0}")]
    OutOfOrder(String),

    /// The row is still referenced by protected data (recorded answers, cursors).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Transient Errors ===
    /// Uniqueness violation on `(user_id, survey_id)` while creating a result.
    #[error("Duplicate result: {0}")]
    DuplicateResult(String),

    /// Serialization failure, deadlock or lock timeout.
    #[error("Concurrent update: {0}")]
    Concurrency(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for callers rendering the error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::ScopeMismatch(_) => "SCOPE_MISMATCH",
            Self::SelfLoop(_) => "SELF_LOOP",
            Self::OutOfOrder(_) => "OUT_OF_ORDER",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateResult(_) => "DUPLICATE_RESULT",
            Self::Concurrency(_) => "CONCURRENT_UPDATE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether the operation may succeed if the caller tries again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateResult(_) | Self::Concurrency(_))
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::DuplicateResult("r".to_string()).is_retryable());
        assert!(AppError::Concurrency("c".to_string()).is_retryable());

        assert!(!AppError::OutOfOrder("o".to_string()).is_retryable());
        assert!(!AppError::ScopeMismatch("s".to_string()).is_retryable());
        assert!(!AppError::SelfLoop("l".to_string()).is_retryable());
        assert!(!AppError::Database("d".to_string()).is_retryable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::SelfLoop(String::new()).error_code(), "SELF_LOOP");
        assert_eq!(
            AppError::ScopeMismatch(String::new()).error_code(),
            "SCOPE_MISMATCH"
        );
        assert_eq!(AppError::OutOfOrder(String::new()).error_code(), "OUT_OF_ORDER");
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Database("boom".to_string()).is_server_error());
        assert!(!AppError::NotFound("survey".to_string()).is_server_error());
    }

    #[test]
    fn test_display() {
        let err = AppError::NotFound("Choice: abc".to_string());
        assert_eq!(err.to_string(), "Not found: Choice: abc");
    }
}
