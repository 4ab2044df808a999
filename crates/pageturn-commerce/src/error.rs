//! Commerce error types.

use crate::ids::BookId;
use thiserror::Error;

/// Errors that can occur in catalog, review, cart and order operations.
///
/// Variants fall into two classes: client errors (the request itself was
/// wrong and retrying it unchanged will fail again) and internal errors (the
/// system failed). Use [`CommerceError::is_client_error`] to tell them apart.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Order request contained no items.
    #[error("cannot create an empty order")]
    EmptyOrder,

    /// A line's quantity is outside the allowed range.
    #[error("invalid quantity {quantity} for book {book_id}: must be between 1 and 8")]
    InvalidQuantity { book_id: BookId, quantity: i64 },

    /// One or more requested books do not exist.
    #[error("some items are not available: {}", join_ids(.0))]
    ItemsUnavailable(Vec<BookId>),

    /// A single requested resource does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The caller may not act on the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The atomic order write failed and was rolled back.
    #[error("order could not be persisted: {0}")]
    OrderPersistenceFailed(String),

    /// Storage failure outside of order persistence.
    #[error("database error: {0}")]
    Database(String),

    /// Arithmetic overflow in money calculation.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Currency mismatch.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },
}

impl CommerceError {
    /// Shorthand for a missing book.
    pub fn book_not_found(id: BookId) -> Self {
        CommerceError::NotFound {
            entity: "book",
            id: id.get(),
        }
    }

    /// Check if the caller caused this error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CommerceError::EmptyOrder
                | CommerceError::InvalidQuantity { .. }
                | CommerceError::ItemsUnavailable(_)
                | CommerceError::NotFound { .. }
                | CommerceError::Forbidden(_)
                | CommerceError::Validation(_)
        )
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommerceError::NotFound { .. })
    }

    /// Message that is safe to show to the caller.
    ///
    /// Internal errors collapse to a fixed string so storage details stay
    /// in the logs.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "internal error".to_string()
        }
    }

    /// Book ids the caller should remove from the request, if any.
    pub fn unavailable_ids(&self) -> &[BookId] {
        match self {
            CommerceError::ItemsUnavailable(ids) => ids,
            _ => &[],
        }
    }
}

fn join_ids(ids: &[BookId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_unavailable_lists_every_id() {
        let err = CommerceError::ItemsUnavailable(vec![BookId::new(3), BookId::new(11)]);
        assert_eq!(err.to_string(), "some items are not available: 3, 11");
        assert_eq!(err.unavailable_ids(), &[BookId::new(3), BookId::new(11)]);
    }

    #[test]
    fn test_client_vs_internal() {
        assert!(CommerceError::EmptyOrder.is_client_error());
        assert!(CommerceError::book_not_found(BookId::new(1)).is_client_error());
        assert!(!CommerceError::OrderPersistenceFailed("x".into()).is_client_error());
        assert!(!CommerceError::Database("x".into()).is_client_error());
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = CommerceError::Database("no such table: book".into());
        assert_eq!(err.public_message(), "internal error");

        let err = CommerceError::InvalidQuantity {
            book_id: BookId::new(2),
            quantity: 9,
        };
        assert!(err.public_message().contains("invalid quantity 9"));
    }
}
