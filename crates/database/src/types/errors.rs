//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DatabaseError {
    /// Map a sqlx error, keeping unique-constraint violations distinguishable.
    pub(crate) fn from_sqlx(error: sqlx::Error, entity: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Duplicate(entity.to_string())
            }
            _ => DatabaseError::QueryError(error.to_string()),
        }
    }
}
