//! Book catalog module.
//!
//! Contains types for books, authors, categories and time-windowed discounts,
//! plus the pricing rule that picks the active discount for a date.

mod author;
mod book;
mod category;
mod discount;
mod pricing;

pub use author::Author;
pub use book::{Book, BookDetails, BookListing};
pub use category::Category;
pub use discount::Discount;
pub use pricing::{active_discount, resolve_price, today};
