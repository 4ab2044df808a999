//! Checkout module.
//!
//! Contains order types and the order placement transaction.

mod order;
mod placement;

pub use order::{
    validate_quantity, NewOrder, Order, OrderItem, PendingLine, PlacementState, RequestedItem,
    MAX_QUANTITY, MIN_QUANTITY,
};
pub use placement::{get_order, list_orders, place_order, price_lines, PricedOrder};
