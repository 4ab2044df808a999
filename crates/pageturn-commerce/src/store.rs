//! The storage boundary.
//!
//! Engine functions in this crate never touch a database directly. They talk
//! to a [`CatalogStore`], which `pageturn-db` implements on SQLite and the
//! unit tests implement in memory.

use crate::cart::{CartItem, CartLine};
use crate::catalog::{Author, Book, BookDetails, Category};
use crate::checkout::{NewOrder, Order, PendingLine};
use crate::error::CommerceError;
use crate::ids::{BookId, OrderId, ReviewId, UserId};
use crate::review::{NewReview, Review, ReviewQuery};
use crate::search::{BookPage, BookQuery, PageRequest, TitleSearch};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Read and write access to catalog, order, review and cart state.
///
/// Implementations must compute listings set-based: one query for the page
/// and one for the distinct total count, never a query per row.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Run a validated listing query. Prices resolve against `as_of`.
    async fn query_books(&self, query: &BookQuery, as_of: NaiveDate)
        -> Result<BookPage, CommerceError>;

    /// Match title or author name, ordered by title then id.
    async fn search_books(
        &self,
        search: &TitleSearch,
        as_of: NaiveDate,
    ) -> Result<BookPage, CommerceError>;

    /// Load one book with relations and its discount for `as_of`.
    async fn get_book(
        &self,
        id: BookId,
        as_of: NaiveDate,
    ) -> Result<Option<BookDetails>, CommerceError>;

    /// Load every existing book among `ids`, discounts included.
    ///
    /// Missing ids are simply absent from the result.
    async fn get_books(&self, ids: &[BookId]) -> Result<Vec<Book>, CommerceError>;

    async fn book_exists(&self, id: BookId) -> Result<bool, CommerceError>;

    async fn list_categories(&self, page: PageRequest) -> Result<Vec<Category>, CommerceError>;

    async fn list_authors(&self, page: PageRequest) -> Result<Vec<Author>, CommerceError>;

    /// Open an order transaction. The writer owns it until commit or rollback.
    async fn begin_order(&self) -> Result<Box<dyn OrderWriter>, CommerceError>;

    /// Load an order with its items.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CommerceError>;

    /// A user's orders with items, newest first.
    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, CommerceError>;

    async fn list_reviews(
        &self,
        book_id: BookId,
        query: &ReviewQuery,
    ) -> Result<Vec<Review>, CommerceError>;

    async fn get_review(&self, id: ReviewId) -> Result<Option<Review>, CommerceError>;

    async fn insert_review(&self, review: &NewReview) -> Result<Review, CommerceError>;

    /// Delete a review. Returns false if nothing was deleted.
    async fn delete_review(&self, id: ReviewId) -> Result<bool, CommerceError>;

    /// A user's cart, ordered by book id.
    async fn get_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, CommerceError>;

    /// Swap the whole cart for `lines` inside one transaction.
    async fn replace_cart(&self, user_id: UserId, lines: &[CartLine])
        -> Result<(), CommerceError>;
}

/// An open order transaction.
///
/// Dropping a writer without calling [`OrderWriter::commit`] must discard
/// everything it wrote.
#[async_trait]
pub trait OrderWriter: Send {
    /// Insert the order header and return its generated id.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, CommerceError>;

    /// Insert every line for `order_id`.
    async fn insert_order_items(
        &mut self,
        order_id: OrderId,
        lines: &[PendingLine],
    ) -> Result<(), CommerceError>;

    async fn commit(self: Box<Self>) -> Result<(), CommerceError>;

    async fn rollback(self: Box<Self>) -> Result<(), CommerceError>;
}
