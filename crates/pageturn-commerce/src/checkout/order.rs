//! Order types.

use crate::error::CommerceError;
use crate::ids::{BookId, OrderId, OrderItemId, UserId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest quantity a line may carry.
pub const MIN_QUANTITY: i64 = 1;

/// Largest quantity a line may carry.
pub const MAX_QUANTITY: i64 = 8;

/// Reject a quantity outside `MIN_QUANTITY..=MAX_QUANTITY`.
pub fn validate_quantity(book_id: BookId, quantity: i64) -> Result<(), CommerceError> {
    if (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CommerceError::InvalidQuantity { book_id, quantity })
    }
}

/// One line of an order request, as the customer sent it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestedItem {
    pub book_id: BookId,
    pub quantity: i64,
}

impl RequestedItem {
    pub fn new(book_id: BookId, quantity: i64) -> Self {
        Self { book_id, quantity }
    }
}

/// A validated and priced line waiting to be written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingLine {
    pub book_id: BookId,
    pub quantity: i64,
    /// Price per copy, frozen at placement.
    pub unit_price: Money,
}

impl PendingLine {
    /// `unit_price × quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// An order header waiting to be written. The store assigns id and timestamp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_amount: Money,
}

/// A placed order. Immutable once committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Customer who placed it.
    pub user_id: UserId,
    /// When the store accepted it.
    #[serde(rename = "order_date")]
    pub created_at: DateTime<Utc>,
    /// Sum of every line total.
    #[serde(rename = "order_amount")]
    pub total_amount: Money,
    /// Lines, ordered by id.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Get total number of copies across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub quantity: i64,
    /// Price paid per copy. Later discount edits never change it.
    #[serde(rename = "price")]
    pub unit_price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Stages of a placement.
///
/// `Rejected` ends a placement the caller got wrong; `Aborted` ends one the
/// system could not complete, after rolling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementState {
    Validating,
    Pricing,
    Persisting,
    Committed,
    Rejected,
    Aborted,
}

impl PlacementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementState::Validating => "validating",
            PlacementState::Pricing => "pricing",
            PlacementState::Persisting => "persisting",
            PlacementState::Committed => "committed",
            PlacementState::Rejected => "rejected",
            PlacementState::Aborted => "aborted",
        }
    }

    /// Check if the placement has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlacementState::Committed | PlacementState::Rejected | PlacementState::Aborted
        )
    }

    /// Terminal state for a placement that failed with `err`.
    pub fn for_error(err: &CommerceError) -> Self {
        if err.is_client_error() {
            PlacementState::Rejected
        } else {
            PlacementState::Aborted
        }
    }
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_quantity_bounds() {
        let book = BookId::new(1);
        assert!(validate_quantity(book, 1).is_ok());
        assert!(validate_quantity(book, 8).is_ok());
        assert!(matches!(
            validate_quantity(book, 0),
            Err(CommerceError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(validate_quantity(book, 9).is_err());
        assert!(validate_quantity(book, -3).is_err());
    }

    #[test]
    fn test_order_serializes_public_field_names() {
        let order = Order {
            id: OrderId::new(5),
            user_id: UserId::new(2),
            created_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            total_amount: Money::new(2250, Currency::USD),
            items: vec![OrderItem {
                id: OrderItemId::new(1),
                order_id: OrderId::new(5),
                book_id: BookId::new(3),
                quantity: 3,
                unit_price: Money::new(750, Currency::USD),
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["order_amount"]["amount_cents"], 2250);
        assert!(json.get("order_date").is_some());
        assert_eq!(json["items"][0]["price"]["amount_cents"], 750);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_placement_state_for_error() {
        assert_eq!(
            PlacementState::for_error(&CommerceError::EmptyOrder),
            PlacementState::Rejected
        );
        assert_eq!(
            PlacementState::for_error(&CommerceError::OrderPersistenceFailed("x".into())),
            PlacementState::Aborted
        );
        assert!(PlacementState::Committed.is_terminal());
        assert!(!PlacementState::Pricing.is_terminal());
    }
}
