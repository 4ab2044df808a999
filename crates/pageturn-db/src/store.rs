//! [`CatalogStore`] on SQLite.

use crate::db::Db;
use crate::orders::SqliteOrderWriter;
use crate::{books, carts, orders, reviews};
use async_trait::async_trait;
use chrono::NaiveDate;
use pageturn_commerce::cart::{CartItem, CartLine};
use pageturn_commerce::catalog::{active_discount, Author, Book, BookDetails, Category};
use pageturn_commerce::checkout::Order;
use pageturn_commerce::review::{NewReview, Review, ReviewQuery};
use pageturn_commerce::search::{BookPage, BookQuery, PageRequest, TitleSearch};
use pageturn_commerce::store::{CatalogStore, OrderWriter};
use pageturn_commerce::{BookId, CommerceError, Currency, OrderId, ReviewId, UserId};
use sqlx::SqlitePool;

/// Catalog store backed by a SQLite pool.
///
/// Amounts are stored as integer minor units of `currency`.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pub(crate) pool: SqlitePool,
    pub(crate) currency: Currency,
}

impl SqliteCatalogStore {
    /// Create a new store over an open database.
    pub fn new(db: &Db, currency: Currency) -> Self {
        Self {
            pool: db.pool().clone(),
            currency,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn query_books(
        &self,
        query: &BookQuery,
        as_of: NaiveDate,
    ) -> Result<BookPage, CommerceError> {
        Ok(books::query_books(&self.pool, query, as_of, self.currency).await?)
    }

    async fn search_books(
        &self,
        search: &TitleSearch,
        as_of: NaiveDate,
    ) -> Result<BookPage, CommerceError> {
        Ok(books::search_books(&self.pool, search, as_of, self.currency).await?)
    }

    async fn get_book(
        &self,
        id: BookId,
        as_of: NaiveDate,
    ) -> Result<Option<BookDetails>, CommerceError> {
        let Some(book) = books::get_books(&self.pool, &[id], self.currency)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let author = books::get_author(&self.pool, book.author_id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "author",
                id: book.author_id.get(),
            })?;
        let category = books::get_category(&self.pool, book.category_id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "category",
                id: book.category_id.get(),
            })?;
        let discount_price = active_discount(&book, as_of).map(|d| d.discount_price);
        Ok(Some(BookDetails {
            book,
            author,
            category,
            discount_price,
        }))
    }

    async fn get_books(&self, ids: &[BookId]) -> Result<Vec<Book>, CommerceError> {
        Ok(books::get_books(&self.pool, ids, self.currency).await?)
    }

    async fn book_exists(&self, id: BookId) -> Result<bool, CommerceError> {
        Ok(books::book_exists(&self.pool, id).await?)
    }

    async fn list_categories(&self, page: PageRequest) -> Result<Vec<Category>, CommerceError> {
        Ok(books::list_categories(&self.pool, page.offset, page.limit).await?)
    }

    async fn list_authors(&self, page: PageRequest) -> Result<Vec<Author>, CommerceError> {
        Ok(books::list_authors(&self.pool, page.offset, page.limit).await?)
    }

    async fn begin_order(&self) -> Result<Box<dyn OrderWriter>, CommerceError> {
        Ok(Box::new(SqliteOrderWriter::begin(&self.pool).await?))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(orders::get_order(&self.pool, id, self.currency).await?)
    }

    async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, CommerceError> {
        Ok(orders::list_orders(&self.pool, user_id, self.currency).await?)
    }

    async fn list_reviews(
        &self,
        book_id: BookId,
        query: &ReviewQuery,
    ) -> Result<Vec<Review>, CommerceError> {
        Ok(reviews::list_reviews(&self.pool, book_id, query).await?)
    }

    async fn get_review(&self, id: ReviewId) -> Result<Option<Review>, CommerceError> {
        Ok(reviews::get_review(&self.pool, id).await?)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, CommerceError> {
        Ok(reviews::insert_review(&self.pool, review).await?)
    }

    async fn delete_review(&self, id: ReviewId) -> Result<bool, CommerceError> {
        Ok(reviews::delete_review(&self.pool, id).await?)
    }

    async fn get_cart(&self, user_id: UserId) -> Result<Vec<CartItem>, CommerceError> {
        Ok(carts::get_cart(&self.pool, user_id).await?)
    }

    async fn replace_cart(
        &self,
        user_id: UserId,
        lines: &[CartLine],
    ) -> Result<(), CommerceError> {
        Ok(carts::replace_cart(&self.pool, user_id, lines).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_row_futures_are_send() {
        let db = Db::open_in_memory().await.unwrap();
        let pool = db.pool();
        let query = ReviewQuery::new();
        let lines = [CartLine::new(BookId::new(1), 1)];

        assert_send(&reviews::list_reviews(pool, BookId::new(1), &query));
        assert_send(&carts::replace_cart(pool, UserId::new(1), &lines));
        assert_send(&orders::list_orders(pool, UserId::new(1), Currency::USD));
    }
}
