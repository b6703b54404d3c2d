use std::path::PathBuf;

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors raised by the repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row violated a store-level constraint (NOT NULL, CHECK, UNIQUE, FOREIGN KEY).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation => {
                    return StoreError::Validation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound("Collection 42".to_string());
        assert_eq!(err.to_string(), "Collection 42 not found");
    }
}
