//! Error types for Bear database access

use std::path::PathBuf;

use thiserror::Error;

/// Bear database access error type
#[derive(Error, Debug)]
pub enum BearDbError {
    /// Database file missing at the configured path
    #[error("Bear database not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to open or validate the database file
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Caller-supplied input rejected before touching the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// Blocking task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

/// Result type for Bear database operations
pub type BearDbResult<T> = Result<T, BearDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_path() {
        let err = BearDbError::NotFound(PathBuf::from("/tmp/missing/database.sqlite"));
        assert_eq!(
            err.to_string(),
            "Bear database not found at /tmp/missing/database.sqlite"
        );
    }

    #[test]
    fn test_rusqlite_errors_become_query_errors() {
        let err: BearDbError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BearDbError::Query(_)));
        assert!(err.to_string().starts_with("Query error:"));
    }
}
