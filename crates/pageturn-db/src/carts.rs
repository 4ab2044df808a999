//! Cart persistence.

use crate::error::Result;
use crate::schema::CartItem;
use pageturn_commerce::cart::{self, CartLine};
use pageturn_commerce::{BookId, UserId};
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

pub(crate) async fn get_cart(pool: &SqlitePool, user_id: UserId) -> Result<Vec<cart::CartItem>> {
    let sql = Query::select()
        .columns([CartItem::UserId, CartItem::BookId, CartItem::Quantity])
        .from(CartItem::Table)
        .and_where(Expr::col(CartItem::UserId).eq(user_id.get()))
        .order_by(CartItem::BookId, Order::Asc)
        .to_string(SqliteQueryBuilder);

    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(cart::CartItem {
            user_id: UserId::new(row.try_get("user_id")?),
            book_id: BookId::new(row.try_get("book_id")?),
            quantity: row.try_get("quantity")?,
        });
    }
    Ok(items)
}

fn insert_sql(user_id: UserId, lines: &[CartLine]) -> String {
    let mut insert = Query::insert();
    insert
        .into_table(CartItem::Table)
        .columns([CartItem::UserId, CartItem::BookId, CartItem::Quantity]);
    for line in lines {
        insert.values_panic([
            user_id.get().into(),
            line.book_id.get().into(),
            line.quantity.into(),
        ]);
    }
    insert.to_string(SqliteQueryBuilder)
}

/// Delete the user's cart and insert `lines`, all in one transaction.
pub(crate) async fn replace_cart(
    pool: &SqlitePool,
    user_id: UserId,
    lines: &[CartLine],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let delete = Query::delete()
        .from_table(CartItem::Table)
        .and_where(Expr::col(CartItem::UserId).eq(user_id.get()))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&delete).execute(&mut *tx).await?;

    if !lines.is_empty() {
        let insert = insert_sql(user_id, lines);
        sqlx::query(&insert).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
