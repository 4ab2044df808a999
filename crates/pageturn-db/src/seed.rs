//! Catalog writes used to load data.
//!
//! These sit outside [`pageturn_commerce::store::CatalogStore`]: the storefront
//! only reads the catalog, while operators load and edit it.

use crate::error::{DbError, Result};
use crate::rows::{fold_case, format_date};
use crate::schema::{Author, Book, Category, Discount};
use crate::store::SqliteCatalogStore;
use chrono::NaiveDate;
use pageturn_commerce::{AuthorId, BookId, CategoryId, DiscountId, Money};
use sea_query::{Expr, Query, SqliteQueryBuilder};
use tracing::debug;

/// A book to insert.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub category_id: CategoryId,
    pub author_id: AuthorId,
    pub title: String,
    pub summary: Option<String>,
    pub list_price: Money,
    pub cover: Option<String>,
}

/// A discount to insert.
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub book_id: BookId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub discount_price: Money,
}

impl SqliteCatalogStore {
    fn ensure_currency(&self, amount: &Money) -> Result<()> {
        if amount.currency != self.currency {
            return Err(DbError::Invalid(format!(
                "amount in {} but the store uses {}",
                amount.currency, self.currency
            )));
        }
        Ok(())
    }

    pub async fn insert_author(&self, name: &str, bio: Option<&str>) -> Result<AuthorId> {
        let sql = Query::insert()
            .into_table(Author::Table)
            .columns([Author::Name, Author::NameKey, Author::Bio])
            .values_panic([
                name.into(),
                fold_case(name).into(),
                bio.map(str::to_string).into(),
            ])
            .to_string(SqliteQueryBuilder);
        let done = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(AuthorId::new(done.last_insert_rowid()))
    }

    pub async fn insert_category(&self, name: &str, description: Option<&str>) -> Result<CategoryId> {
        let sql = Query::insert()
            .into_table(Category::Table)
            .columns([Category::Name, Category::Description])
            .values_panic([name.into(), description.map(str::to_string).into()])
            .to_string(SqliteQueryBuilder);
        let done = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(CategoryId::new(done.last_insert_rowid()))
    }

    /// Insert a book. The list price must be positive.
    pub async fn insert_book(&self, book: &NewBook) -> Result<BookId> {
        if !book.list_price.is_positive() {
            return Err(DbError::Invalid(format!(
                "list price of {:?} must be positive",
                book.title
            )));
        }
        if book.title.trim().is_empty() {
            return Err(DbError::Invalid("book title must not be empty".into()));
        }
        self.ensure_currency(&book.list_price)?;

        let sql = Query::insert()
            .into_table(Book::Table)
            .columns([
                Book::CategoryId,
                Book::AuthorId,
                Book::Title,
                Book::TitleKey,
                Book::Summary,
                Book::ListPrice,
                Book::Cover,
            ])
            .values_panic([
                book.category_id.get().into(),
                book.author_id.get().into(),
                book.title.clone().into(),
                fold_case(&book.title).into(),
                book.summary.clone().into(),
                book.list_price.amount_cents.into(),
                book.cover.clone().into(),
            ])
            .to_string(SqliteQueryBuilder);
        let done = sqlx::query(&sql).execute(&self.pool).await?;
        let id = BookId::new(done.last_insert_rowid());
        debug!(book_id = %id, "book inserted");
        Ok(id)
    }

    /// Insert a discount window. `end_date` may not precede `start_date`.
    pub async fn insert_discount(&self, discount: &NewDiscount) -> Result<DiscountId> {
        if discount.end_date.is_some_and(|end| end < discount.start_date) {
            return Err(DbError::Invalid(format!(
                "discount for book {} ends before it starts",
                discount.book_id
            )));
        }
        if !discount.discount_price.is_positive() {
            return Err(DbError::Invalid("discount price must be positive".into()));
        }
        self.ensure_currency(&discount.discount_price)?;

        let sql = Query::insert()
            .into_table(Discount::Table)
            .columns([
                Discount::BookId,
                Discount::StartDate,
                Discount::EndDate,
                Discount::DiscountPrice,
            ])
            .values_panic([
                discount.book_id.get().into(),
                format_date(discount.start_date).into(),
                discount.end_date.map(format_date).into(),
                discount.discount_price.amount_cents.into(),
            ])
            .to_string(SqliteQueryBuilder);
        let done = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(DiscountId::new(done.last_insert_rowid()))
    }

    /// Change a discount's price and end date. Returns false if it does not exist.
    pub async fn update_discount(
        &self,
        id: DiscountId,
        discount_price: Money,
        end_date: Option<NaiveDate>,
    ) -> Result<bool> {
        self.ensure_currency(&discount_price)?;
        let sql = Query::update()
            .table(Discount::Table)
            .values([
                (Discount::DiscountPrice, discount_price.amount_cents.into()),
                (Discount::EndDate, end_date.map(format_date).into()),
            ])
            .and_where(Expr::col(Discount::Id).eq(id.get()))
            .to_string(SqliteQueryBuilder);
        let done = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }
}
