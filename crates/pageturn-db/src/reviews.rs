//! Review persistence.

use crate::error::Result;
use crate::rows::{now_timestamp, page_bounds, parse_timestamp};
use crate::schema::Review;
use pageturn_commerce::review::{self, NewReview, ReviewQuery, ReviewSort};
use pageturn_commerce::{BookId, ReviewId, UserId};
use sea_query::{Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn select_reviews() -> SelectStatement {
    Query::select()
        .columns([
            Review::Id,
            Review::BookId,
            Review::UserId,
            Review::Title,
            Review::Details,
            Review::Rating,
            Review::CreatedAt,
        ])
        .from(Review::Table)
        .to_owned()
}

fn review_from_row(row: &SqliteRow) -> Result<review::Review> {
    let created_at: String = row.try_get("created_at")?;
    Ok(review::Review {
        id: ReviewId::new(row.try_get("id")?),
        book_id: BookId::new(row.try_get("book_id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        title: row.try_get("title")?,
        details: row.try_get("details")?,
        rating: row.try_get("rating")?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

fn list_sql(book_id: BookId, query: &ReviewQuery) -> Result<String> {
    let (offset, limit) = page_bounds(query.offset, query.limit)?;
    let order = match query.sort {
        ReviewSort::DateDesc => Order::Desc,
        ReviewSort::DateAsc => Order::Asc,
    };
    let mut select = select_reviews();
    select.and_where(Expr::col(Review::BookId).eq(book_id.get()));
    if let Some(rating) = query.rating {
        select.and_where(Expr::col(Review::Rating).eq(rating));
    }
    Ok(select
        .order_by(Review::CreatedAt, order.clone())
        .order_by(Review::Id, order)
        .limit(limit)
        .offset(offset)
        .to_string(SqliteQueryBuilder))
}

pub(crate) async fn list_reviews(
    pool: &SqlitePool,
    book_id: BookId,
    query: &ReviewQuery,
) -> Result<Vec<review::Review>> {
    let sql = list_sql(book_id, query)?;
    sqlx::query(&sql)
        .fetch_all(pool)
        .await?
        .iter()
        .map(review_from_row)
        .collect()
}

pub(crate) async fn get_review(pool: &SqlitePool, id: ReviewId) -> Result<Option<review::Review>> {
    let sql = select_reviews()
        .and_where(Expr::col(Review::Id).eq(id.get()))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&sql)
        .fetch_optional(pool)
        .await?
        .map(|row| review_from_row(&row))
        .transpose()
}

/// Insert a review and return it as stored.
pub(crate) async fn insert_review(pool: &SqlitePool, new: &NewReview) -> Result<review::Review> {
    let created_at = now_timestamp();
    let sql = Query::insert()
        .into_table(Review::Table)
        .columns([
            Review::BookId,
            Review::UserId,
            Review::Title,
            Review::Details,
            Review::Rating,
            Review::CreatedAt,
        ])
        .values_panic([
            new.book_id.get().into(),
            new.user_id.get().into(),
            new.title.clone().into(),
            new.details.clone().into(),
            new.rating.into(),
            created_at.clone().into(),
        ])
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&sql).execute(pool).await?;
    Ok(review::Review {
        id: ReviewId::new(done.last_insert_rowid()),
        book_id: new.book_id,
        user_id: new.user_id,
        title: new.title.clone(),
        details: new.details.clone(),
        rating: new.rating,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

pub(crate) async fn delete_review(pool: &SqlitePool, id: ReviewId) -> Result<bool> {
    let sql = Query::delete()
        .from_table(Review::Table)
        .and_where(Expr::col(Review::Id).eq(id.get()))
        .to_string(SqliteQueryBuilder);
    let done = sqlx::query(&sql).execute(pool).await?;
    Ok(done.rows_affected() > 0)
}
