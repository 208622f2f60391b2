//! Mapping of database errors onto [`AppError`].

use sea_orm::{DbErr, SqlErr};
use survey_common::AppError;

/// Unique index guarding one result per `(user_id, survey_id)`.
pub const RESULT_UNIQUE_INDEX: &str = "idx_survey_result_user_survey";

/// Convert a [`DbErr`] into an [`AppError`], classifying constraint
/// violations and transient concurrency failures.
#[must_use]
pub fn map_db_err(err: DbErr) -> AppError {
    let message = err.to_string();

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains(RESULT_UNIQUE_INDEX) || message.contains(RESULT_UNIQUE_INDEX) {
                AppError::DuplicateResult(detail)
            } else {
                AppError::Conflict(detail)
            }
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::Conflict(detail),
        _ if is_transient(&message) => AppError::Concurrency(message),
        _ => AppError::Database(message),
    }
}

/// Serialization failures, deadlocks and lock timeouts (SQLSTATE 40001, 40P01, 55P03).
fn is_transient(message: &str) -> bool {
    const MARKERS: [&str; 6] = [
        "40001",
        "40P01",
        "55P03",
        "could not serialize access",
        "deadlock detected",
        "lock timeout",
    ];
    MARKERS.iter().any(|marker| message.contains(marker))
}
