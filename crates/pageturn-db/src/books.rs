//! Book listing queries.
//!
//! A listing is one SELECT over `book`, joined to its author and category and
//! left-joined to two per-book subqueries: review aggregates and the active
//! discount. The same filtered FROM/WHERE feeds both the page query and the
//! distinct count. Statements are rendered to SQL text before any await.

use crate::error::Result;
use crate::rows::{format_date, page_bounds, parse_date};
use crate::schema::{Author, Book, Category, Discount, Review};
use chrono::NaiveDate;
use pageturn_commerce::catalog::{self, BookListing};
use pageturn_commerce::search::{
    BookFilters, BookPage, BookQuery, Page, SortKey, TitleSearch, LIKE_ESCAPE,
};
use pageturn_commerce::{AuthorId, BookId, CategoryId, Currency, DiscountId, Money};
use sea_query::{
    Alias, Asterisk, Condition, Expr, Func, JoinType, LikeExpr, Order, Query, SelectStatement,
    SimpleExpr, SqliteQueryBuilder,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

const REVIEW_STATS: &str = "review_stats";
const ACTIVE_DISCOUNT: &str = "active_discount";
const REVIEW_COUNT: &str = "review_count";
const AVG_RATING: &str = "avg_rating";

fn col(table: &'static str, column: &'static str) -> Expr {
    Expr::col((Alias::new(table), Alias::new(column)))
}

/// Review count and mean rating per book.
fn review_stats() -> SelectStatement {
    Query::select()
        .column(Review::BookId)
        .expr_as(Func::count(Expr::col(Review::Id)), Alias::new(REVIEW_COUNT))
        .expr_as(Func::avg(Expr::col(Review::Rating)), Alias::new(AVG_RATING))
        .from(Review::Table)
        .group_by_col(Review::BookId)
        .to_owned()
}

/// The active discount per book on `as_of`: the qualifying row with the
/// smallest id. Both window ends are inclusive.
fn active_discounts(as_of: NaiveDate) -> SelectStatement {
    let today = format_date(as_of);
    let first_active = Query::select()
        .expr(Func::min(Expr::col(Discount::Id)))
        .from(Discount::Table)
        .cond_where(
            Condition::all()
                .add(Expr::col(Discount::StartDate).lte(today.clone()))
                .add(
                    Condition::any()
                        .add(Expr::col(Discount::EndDate).is_null())
                        .add(Expr::col(Discount::EndDate).gte(today)),
                ),
        )
        .group_by_col(Discount::BookId)
        .to_owned();

    Query::select()
        .columns([Discount::BookId, Discount::DiscountPrice])
        .from(Discount::Table)
        .and_where(Expr::col(Discount::Id).in_subquery(first_active))
        .to_owned()
}

fn discount_price() -> Expr {
    col(ACTIVE_DISCOUNT, "discount_price")
}

fn effective_price() -> SimpleExpr {
    Func::coalesce([
        discount_price().into(),
        Expr::col((Book::Table, Book::ListPrice)).into(),
    ])
    .into()
}

fn coalesce_zero(expr: Expr) -> SimpleExpr {
    Func::coalesce([expr.into(), Expr::val(0).into()]).into()
}

/// FROM + JOINs + WHERE for `filters`, with no projection.
fn filtered(filters: &BookFilters, as_of: NaiveDate) -> SelectStatement {
    let mut cond = Condition::all();
    if let Some(id) = filters.category_id {
        cond = cond.add(Expr::col((Book::Table, Book::CategoryId)).eq(id.get()));
    }
    if let Some(id) = filters.author_id {
        cond = cond.add(Expr::col((Book::Table, Book::AuthorId)).eq(id.get()));
    }
    if let Some(min) = filters.min_rating {
        cond = cond.add(Expr::expr(coalesce_zero(col(REVIEW_STATS, AVG_RATING))).gte(min));
    }
    // The pattern is already folded, so it is matched against the key columns.
    if let Some(pattern) = filters.search_pattern() {
        cond = cond.add(
            Condition::any()
                .add(
                    Expr::col((Book::Table, Book::TitleKey))
                        .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE)),
                )
                .add(
                    Expr::col((Author::Table, Author::NameKey))
                        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                ),
        );
    }

    Query::select()
        .from(Book::Table)
        .inner_join(
            Author::Table,
            Expr::col((Author::Table, Author::Id)).equals((Book::Table, Book::AuthorId)),
        )
        .inner_join(
            Category::Table,
            Expr::col((Category::Table, Category::Id)).equals((Book::Table, Book::CategoryId)),
        )
        .join_subquery(
            JoinType::LeftJoin,
            review_stats(),
            Alias::new(REVIEW_STATS),
            col(REVIEW_STATS, "book_id").equals((Book::Table, Book::Id)),
        )
        .join_subquery(
            JoinType::LeftJoin,
            active_discounts(as_of),
            Alias::new(ACTIVE_DISCOUNT),
            col(ACTIVE_DISCOUNT, "book_id").equals((Book::Table, Book::Id)),
        )
        .cond_where(cond)
        .to_owned()
}

/// `SELECT COUNT(*) FROM (SELECT DISTINCT book.id ...)`.
fn count_statement(base: &SelectStatement) -> SelectStatement {
    let ids = base
        .clone()
        .distinct()
        .column((Book::Table, Book::Id))
        .to_owned();
    Query::select()
        .expr(Func::count(Expr::col(Asterisk)))
        .from_subquery(ids, Alias::new("counted"))
        .to_owned()
}

fn project(select: &mut SelectStatement) {
    select
        .expr_as(Expr::col((Book::Table, Book::Id)), Alias::new("book_id"))
        .expr_as(Expr::col((Book::Table, Book::Title)), Alias::new("title"))
        .expr_as(Expr::col((Book::Table, Book::Summary)), Alias::new("summary"))
        .expr_as(Expr::col((Book::Table, Book::ListPrice)), Alias::new("list_price"))
        .expr_as(Expr::col((Book::Table, Book::Cover)), Alias::new("cover"))
        .expr_as(Expr::col((Author::Table, Author::Id)), Alias::new("author_id"))
        .expr_as(Expr::col((Author::Table, Author::Name)), Alias::new("author_name"))
        .expr_as(Expr::col((Author::Table, Author::Bio)), Alias::new("author_bio"))
        .expr_as(Expr::col((Category::Table, Category::Id)), Alias::new("category_id"))
        .expr_as(Expr::col((Category::Table, Category::Name)), Alias::new("category_name"))
        .expr_as(
            Expr::col((Category::Table, Category::Description)),
            Alias::new("category_description"),
        )
        .expr_as(discount_price(), Alias::new("discount_price"))
        .expr_as(col(REVIEW_STATS, REVIEW_COUNT), Alias::new(REVIEW_COUNT))
        .expr_as(col(REVIEW_STATS, AVG_RATING), Alias::new(AVG_RATING));
}

fn apply_sort(select: &mut SelectStatement, sort: SortKey) {
    match sort {
        SortKey::OnSale => {
            select
                .order_by_expr(discount_price().is_not_null(), Order::Desc)
                .order_by_expr(effective_price(), Order::Asc);
        }
        SortKey::OnSaleHome => {
            select.order_by_expr(
                Expr::col((Book::Table, Book::ListPrice)).sub(discount_price()),
                Order::Desc,
            );
        }
        SortKey::Popularity => {
            select
                .order_by_expr(coalesce_zero(col(REVIEW_STATS, REVIEW_COUNT)), Order::Desc)
                .order_by_expr(effective_price(), Order::Asc);
        }
        SortKey::Recommended => {
            select
                .order_by_expr(coalesce_zero(col(REVIEW_STATS, AVG_RATING)), Order::Desc)
                .order_by_expr(effective_price(), Order::Asc);
        }
        SortKey::PriceAsc => {
            select.order_by_expr(effective_price(), Order::Asc);
        }
        SortKey::PriceDesc => {
            select.order_by_expr(effective_price(), Order::Desc);
        }
    }
    select.order_by((Book::Table, Book::Id), Order::Asc);
}

/// Page and count SQL for a listing query.
pub(crate) fn listing_sql(query: &BookQuery, as_of: NaiveDate) -> Result<(String, String)> {
    let (offset, limit) = page_bounds(query.offset, query.limit)?;
    let base = filtered(&query.filters, as_of);
    let count = count_statement(&base);

    let mut page = base;
    // Counted above, so the restriction does not shrink total_count.
    if query.sort.restricts_to_discounted() {
        page.and_where(discount_price().is_not_null());
    }
    project(&mut page);
    apply_sort(&mut page, query.sort);
    page.limit(limit).offset(offset);

    Ok((
        page.to_string(SqliteQueryBuilder),
        count.to_string(SqliteQueryBuilder),
    ))
}

/// Page and count SQL for a title/author search.
pub(crate) fn search_sql(search: &TitleSearch, as_of: NaiveDate) -> Result<(String, String)> {
    let (offset, limit) = page_bounds(search.offset, search.limit)?;
    let filters = BookFilters {
        search: Some(search.term.trim().to_string()),
        ..BookFilters::default()
    };
    let base = filtered(&filters, as_of);
    let count = count_statement(&base);

    let mut page = base;
    project(&mut page);
    page.order_by((Book::Table, Book::Title), Order::Asc)
        .order_by((Book::Table, Book::Id), Order::Asc)
        .limit(limit)
        .offset(offset);

    Ok((
        page.to_string(SqliteQueryBuilder),
        count.to_string(SqliteQueryBuilder),
    ))
}

fn listing_from_row(row: &SqliteRow, currency: Currency) -> Result<BookListing> {
    let list_price = Money::new(row.try_get("list_price")?, currency);
    let discount_price = row
        .try_get::<Option<i64>, _>("discount_price")?
        .map(|cents| Money::new(cents, currency));

    Ok(BookListing {
        id: BookId::new(row.try_get("book_id")?),
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        list_price,
        cover: row.try_get("cover")?,
        author: catalog::Author {
            id: AuthorId::new(row.try_get("author_id")?),
            name: row.try_get("author_name")?,
            bio: row.try_get("author_bio")?,
        },
        category: catalog::Category {
            id: CategoryId::new(row.try_get("category_id")?),
            name: row.try_get("category_name")?,
            description: row.try_get("category_description")?,
        },
        discount_price,
        effective_price: discount_price.unwrap_or(list_price),
        review_count: row.try_get::<Option<i64>, _>(REVIEW_COUNT)?.unwrap_or(0),
        average_rating: row.try_get::<Option<f64>, _>(AVG_RATING)?.unwrap_or(0.0),
    })
}

async fn run_page(
    pool: &SqlitePool,
    page_sql: String,
    count_sql: String,
    offset: i64,
    limit: i64,
    currency: Currency,
) -> Result<BookPage> {
    let total_count: i64 = sqlx::query(&count_sql).fetch_one(pool).await?.try_get(0)?;

    let rows = sqlx::query(&page_sql).fetch_all(pool).await?;
    let items = rows
        .iter()
        .map(|row| listing_from_row(row, currency))
        .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(items, total_count, offset, limit))
}

pub(crate) async fn query_books(
    pool: &SqlitePool,
    query: &BookQuery,
    as_of: NaiveDate,
    currency: Currency,
) -> Result<BookPage> {
    let (page_sql, count_sql) = listing_sql(query, as_of)?;
    run_page(pool, page_sql, count_sql, query.offset, query.limit, currency).await
}

pub(crate) async fn search_books(
    pool: &SqlitePool,
    search: &TitleSearch,
    as_of: NaiveDate,
    currency: Currency,
) -> Result<BookPage> {
    let (page_sql, count_sql) = search_sql(search, as_of)?;
    run_page(pool, page_sql, count_sql, search.offset, search.limit, currency).await
}

/// Load books by id with every discount attached, in two queries.
pub(crate) async fn get_books(
    pool: &SqlitePool,
    ids: &[BookId],
    currency: Currency,
) -> Result<Vec<catalog::Book>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();

    let books_sql = Query::select()
        .columns([
            Book::Id,
            Book::CategoryId,
            Book::AuthorId,
            Book::Title,
            Book::Summary,
            Book::ListPrice,
            Book::Cover,
        ])
        .from(Book::Table)
        .and_where(Expr::col(Book::Id).is_in(raw.clone()))
        .order_by(Book::Id, Order::Asc)
        .to_string(SqliteQueryBuilder);

    let discounts_sql = Query::select()
        .columns([
            Discount::Id,
            Discount::BookId,
            Discount::StartDate,
            Discount::EndDate,
            Discount::DiscountPrice,
        ])
        .from(Discount::Table)
        .and_where(Expr::col(Discount::BookId).is_in(raw))
        .order_by(Discount::Id, Order::Asc)
        .to_string(SqliteQueryBuilder);

    let mut discounts: HashMap<BookId, Vec<catalog::Discount>> = HashMap::new();
    for row in sqlx::query(&discounts_sql).fetch_all(pool).await? {
        let discount = discount_from_row(&row, currency)?;
        discounts.entry(discount.book_id).or_default().push(discount);
    }

    let rows = sqlx::query(&books_sql).fetch_all(pool).await?;
    let mut books = Vec::with_capacity(rows.len());
    for row in rows {
        let id = BookId::new(row.try_get("id")?);
        books.push(catalog::Book {
            id,
            category_id: CategoryId::new(row.try_get("category_id")?),
            author_id: AuthorId::new(row.try_get("author_id")?),
            title: row.try_get("title")?,
            summary: row.try_get("summary")?,
            list_price: Money::new(row.try_get("list_price")?, currency),
            cover: row.try_get("cover")?,
            discounts: discounts.remove(&id).unwrap_or_default(),
        });
    }
    Ok(books)
}

fn discount_from_row(row: &SqliteRow, currency: Currency) -> Result<catalog::Discount> {
    let start: String = row.try_get("start_date")?;
    let end: Option<String> = row.try_get("end_date")?;
    Ok(catalog::Discount {
        id: DiscountId::new(row.try_get("id")?),
        book_id: BookId::new(row.try_get("book_id")?),
        start_date: parse_date("start_date", &start)?,
        end_date: end
            .as_deref()
            .map(|value| parse_date("end_date", value))
            .transpose()?,
        discount_price: Money::new(row.try_get("discount_price")?, currency),
    })
}

pub(crate) async fn book_exists(pool: &SqlitePool, id: BookId) -> Result<bool> {
    let sql = Query::select()
        .column(Book::Id)
        .from(Book::Table)
        .and_where(Expr::col(Book::Id).eq(id.get()))
        .limit(1)
        .to_string(SqliteQueryBuilder);
    Ok(sqlx::query(&sql).fetch_optional(pool).await?.is_some())
}

pub(crate) async fn get_author(pool: &SqlitePool, id: AuthorId) -> Result<Option<catalog::Author>> {
    let sql = Query::select()
        .columns([Author::Id, Author::Name, Author::Bio])
        .from(Author::Table)
        .and_where(Expr::col(Author::Id).eq(id.get()))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&sql)
        .fetch_optional(pool)
        .await?
        .map(|row| author_from_row(&row))
        .transpose()
}

pub(crate) async fn get_category(
    pool: &SqlitePool,
    id: CategoryId,
) -> Result<Option<catalog::Category>> {
    let sql = Query::select()
        .columns([Category::Id, Category::Name, Category::Description])
        .from(Category::Table)
        .and_where(Expr::col(Category::Id).eq(id.get()))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&sql)
        .fetch_optional(pool)
        .await?
        .map(|row| category_from_row(&row))
        .transpose()
}

pub(crate) async fn list_authors(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> Result<Vec<catalog::Author>> {
    let (offset, limit) = page_bounds(offset, limit)?;
    let sql = Query::select()
        .columns([Author::Id, Author::Name, Author::Bio])
        .from(Author::Table)
        .order_by(Author::Id, Order::Asc)
        .limit(limit)
        .offset(offset)
        .to_string(SqliteQueryBuilder);
    sqlx::query(&sql)
        .fetch_all(pool)
        .await?
        .iter()
        .map(author_from_row)
        .collect()
}

pub(crate) async fn list_categories(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> Result<Vec<catalog::Category>> {
    let (offset, limit) = page_bounds(offset, limit)?;
    let sql = Query::select()
        .columns([Category::Id, Category::Name, Category::Description])
        .from(Category::Table)
        .order_by(Category::Id, Order::Asc)
        .limit(limit)
        .offset(offset)
        .to_string(SqliteQueryBuilder);
    sqlx::query(&sql)
        .fetch_all(pool)
        .await?
        .iter()
        .map(category_from_row)
        .collect()
}

fn author_from_row(row: &SqliteRow) -> Result<catalog::Author> {
    Ok(catalog::Author {
        id: AuthorId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
    })
}

fn category_from_row(row: &SqliteRow) -> Result<catalog::Category> {
    Ok(catalog::Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}
