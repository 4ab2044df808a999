//! Book types.

use crate::catalog::{Author, Category, Discount};
use crate::ids::{AuthorId, BookId, CategoryId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A book as stored in the catalog, with its discounts loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique book identifier.
    pub id: BookId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Author.
    pub author_id: AuthorId,
    /// Title, searched case-insensitively.
    pub title: String,
    /// Short summary.
    pub summary: Option<String>,
    /// Undiscounted price. Always positive.
    pub list_price: Money,
    /// Cover image reference.
    pub cover: Option<String>,
    /// Every discount row for this book, ordered by id.
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

impl Book {
    /// Check if the book has a discount active on `date`.
    pub fn is_on_sale(&self, date: chrono::NaiveDate) -> bool {
        crate::catalog::active_discount(self, date).is_some()
    }
}

/// One row of a listing page.
///
/// Everything a storefront grid needs in a single value: the book, its
/// author and category, the resolved price and review aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookListing {
    pub id: BookId,
    pub title: String,
    pub summary: Option<String>,
    pub list_price: Money,
    pub cover: Option<String>,
    pub author: Author,
    pub category: Category,
    /// Active discount price, if a discount applies today.
    pub discount_price: Option<Money>,
    /// `discount_price` when present, otherwise `list_price`.
    pub effective_price: Money,
    /// Number of reviews.
    pub review_count: i64,
    /// Mean review rating, 0.0 when unreviewed.
    pub average_rating: f64,
}

impl BookListing {
    /// Amount saved by the active discount, zero when there is none.
    pub fn savings(&self) -> Money {
        match self.discount_price {
            Some(price) => self
                .list_price
                .checked_sub(&price)
                .unwrap_or_else(|_| Money::zero(self.list_price.currency)),
            None => Money::zero(self.list_price.currency),
        }
    }

    /// Check if a discount applies.
    pub fn is_on_sale(&self) -> bool {
        self.discount_price.is_some()
    }
}

/// A single book with its relations and resolved discount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Author,
    pub category: Category,
    /// Active discount price on the date the details were resolved.
    pub discount_price: Option<Money>,
}

impl BookDetails {
    /// Price the customer would pay right now.
    pub fn effective_price(&self) -> Money {
        self.discount_price.unwrap_or(self.book.list_price)
    }
}
