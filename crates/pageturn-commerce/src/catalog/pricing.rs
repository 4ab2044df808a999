//! Effective price resolution.

use crate::catalog::{Book, Discount};
use crate::money::Money;
use chrono::{Local, NaiveDate};

/// The discount that applies to `book` on `as_of`, if any.
///
/// When windows overlap the discount with the smallest id wins, matching the
/// `MIN(id)` rule the store uses for listings.
pub fn active_discount(book: &Book, as_of: NaiveDate) -> Option<&Discount> {
    book.discounts
        .iter()
        .filter(|d| d.is_active_on(as_of))
        .min_by_key(|d| d.id)
}

/// Price a customer pays for `book` on `as_of`: the active discount price, or
/// the list price when no discount applies.
pub fn resolve_price(book: &Book, as_of: NaiveDate) -> Money {
    active_discount(book, as_of)
        .map(|d| d.discount_price)
        .unwrap_or(book.list_price)
}

/// The calendar date used as "today" for pricing.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
