//! Custom error types for the common library
//!
//! This module defines the storage error taxonomy shared by every service.
//! Constraint violations reported by PostgreSQL are surfaced as
//! [`DatabaseError::Conflict`] so callers can turn them into a domain conflict
//! instead of an opaque query failure.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// The targeted row does not exist
    #[error("Record not found")]
    NotFound,

    /// A uniqueness, foreign-key or compare-and-set guard rejected the write
    #[error("Conflicting write: {0}")]
    Conflict(String),
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => DatabaseError::NotFound,
            SqlxError::Database(ref db_err) if db_err.is_unique_violation() => {
                DatabaseError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("unique constraint {} violated", c))
                        .unwrap_or_else(|| "unique constraint violated".to_string()),
                )
            }
            SqlxError::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                DatabaseError::Conflict(
                    db_err
                        .constraint()
                        .map(|c| format!("row is still referenced ({})", c))
                        .unwrap_or_else(|| "row is still referenced".to_string()),
                )
            }
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                DatabaseError::Connection(err)
            }
            other => DatabaseError::Query(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::Migration(err.to_string())
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
