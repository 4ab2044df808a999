//! Database error types.

use pageturn_commerce::CommerceError;
use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("failed to open database: {0}")]
    Open(String),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored value could not be converted.
    #[error("invalid stored value in {column}: {value}")]
    Decode { column: &'static str, value: String },

    /// Seed data rejected before insert.
    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for CommerceError {
    fn from(e: DbError) -> Self {
        CommerceError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_internal_commerce_error() {
        let err: CommerceError = DbError::Decode {
            column: "start_date",
            value: "yesterday".into(),
        }
        .into();
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("start_date"));
        assert_eq!(err.public_message(), "internal error");
    }
}
