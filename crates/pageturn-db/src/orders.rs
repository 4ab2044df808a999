//! Order persistence.

use crate::error::{DbError, Result};
use crate::rows::{now_timestamp, parse_timestamp};
use crate::schema::{OrderItem, Orders};
use async_trait::async_trait;
use pageturn_commerce::checkout::{self, NewOrder, PendingLine};
use pageturn_commerce::store::OrderWriter;
use pageturn_commerce::{BookId, CommerceError, Currency, Money, OrderId, OrderItemId, UserId};
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::debug;

/// An order transaction on SQLite.
///
/// Dropping the writer without committing rolls the transaction back.
pub struct SqliteOrderWriter {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteOrderWriter {
    pub(crate) async fn begin(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    async fn insert_header(&mut self, order: &NewOrder) -> Result<OrderId> {
        let sql = Query::insert()
            .into_table(Orders::Table)
            .columns([Orders::UserId, Orders::CreatedAt, Orders::TotalAmount])
            .values_panic([
                order.user_id.get().into(),
                now_timestamp().into(),
                order.total_amount.amount_cents.into(),
            ])
            .to_string(SqliteQueryBuilder);

        let done = sqlx::query(&sql).execute(&mut *self.tx).await?;
        Ok(OrderId::new(done.last_insert_rowid()))
    }

    async fn insert_lines(&mut self, order_id: OrderId, lines: &[PendingLine]) -> Result<()> {
        let sql = lines_sql(order_id, lines)?;
        sqlx::query(&sql).execute(&mut *self.tx).await?;
        Ok(())
    }
}

/// One multi-row INSERT for every line of `order_id`.
fn lines_sql(order_id: OrderId, lines: &[PendingLine]) -> Result<String> {
    if lines.is_empty() {
        return Err(DbError::Invalid(format!("order {order_id} has no lines")));
    }
    let mut insert = Query::insert();
    insert.into_table(OrderItem::Table).columns([
        OrderItem::OrderId,
        OrderItem::BookId,
        OrderItem::Quantity,
        OrderItem::UnitPrice,
    ]);
    for line in lines {
        insert.values_panic([
            order_id.get().into(),
            line.book_id.get().into(),
            line.quantity.into(),
            line.unit_price.amount_cents.into(),
        ]);
    }
    Ok(insert.to_string(SqliteQueryBuilder))
}

#[async_trait]
impl OrderWriter for SqliteOrderWriter {
    async fn insert_order(&mut self, order: &NewOrder) -> std::result::Result<OrderId, CommerceError> {
        Ok(self.insert_header(order).await?)
    }

    async fn insert_order_items(
        &mut self,
        order_id: OrderId,
        lines: &[PendingLine],
    ) -> std::result::Result<(), CommerceError> {
        Ok(self.insert_lines(order_id, lines).await?)
    }

    async fn commit(self: Box<Self>) -> std::result::Result<(), CommerceError> {
        self.tx.commit().await.map_err(DbError::from)?;
        debug!("order transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> std::result::Result<(), CommerceError> {
        self.tx.rollback().await.map_err(DbError::from)?;
        debug!("order transaction rolled back");
        Ok(())
    }
}

fn order_from_row(row: &SqliteRow, currency: Currency) -> Result<checkout::Order> {
    let created_at: String = row.try_get("created_at")?;
    Ok(checkout::Order {
        id: OrderId::new(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        created_at: parse_timestamp("created_at", &created_at)?,
        total_amount: Money::new(row.try_get("total_amount")?, currency),
        items: Vec::new(),
    })
}

fn item_from_row(row: &SqliteRow, currency: Currency) -> Result<checkout::OrderItem> {
    Ok(checkout::OrderItem {
        id: OrderItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        book_id: BookId::new(row.try_get("book_id")?),
        quantity: row.try_get("quantity")?,
        unit_price: Money::new(row.try_get("unit_price")?, currency),
    })
}

/// Attach items to `orders` with one query.
async fn load_items(
    pool: &SqlitePool,
    orders: &mut [checkout::Order],
    currency: Currency,
) -> Result<()> {
    if orders.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = orders.iter().map(|o| o.id.get()).collect();
    let sql = Query::select()
        .columns([
            OrderItem::Id,
            OrderItem::OrderId,
            OrderItem::BookId,
            OrderItem::Quantity,
            OrderItem::UnitPrice,
        ])
        .from(OrderItem::Table)
        .and_where(Expr::col(OrderItem::OrderId).is_in(ids))
        .order_by(OrderItem::Id, Order::Asc)
        .to_string(SqliteQueryBuilder);

    let mut items: HashMap<OrderId, Vec<checkout::OrderItem>> = HashMap::new();
    for row in sqlx::query(&sql).fetch_all(pool).await? {
        let item = item_from_row(&row, currency)?;
        items.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = items.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

pub(crate) async fn get_order(
    pool: &SqlitePool,
    id: OrderId,
    currency: Currency,
) -> Result<Option<checkout::Order>> {
    let sql = Query::select()
        .columns([
            Orders::Id,
            Orders::UserId,
            Orders::CreatedAt,
            Orders::TotalAmount,
        ])
        .from(Orders::Table)
        .and_where(Expr::col(Orders::Id).eq(id.get()))
        .to_string(SqliteQueryBuilder);

    let Some(row) = sqlx::query(&sql).fetch_optional(pool).await? else {
        return Ok(None);
    };
    let mut orders = [order_from_row(&row, currency)?];
    load_items(pool, &mut orders, currency).await?;
    let [order] = orders;
    Ok(Some(order))
}

pub(crate) async fn list_orders(
    pool: &SqlitePool,
    user_id: UserId,
    currency: Currency,
) -> Result<Vec<checkout::Order>> {
    let sql = Query::select()
        .columns([
            Orders::Id,
            Orders::UserId,
            Orders::CreatedAt,
            Orders::TotalAmount,
        ])
        .from(Orders::Table)
        .and_where(Expr::col(Orders::UserId).eq(user_id.get()))
        .order_by(Orders::CreatedAt, Order::Desc)
        .order_by(Orders::Id, Order::Desc)
        .to_string(SqliteQueryBuilder);

    let mut orders = sqlx::query(&sql)
        .fetch_all(pool)
        .await?
        .iter()
        .map(|row| order_from_row(row, currency))
        .collect::<Result<Vec<_>>>()?;
    load_items(pool, &mut orders, currency).await?;
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    fn assert_send<T: Send>(_: &T) {}

    fn line(book: i64, quantity: i64) -> PendingLine {
        PendingLine {
            book_id: BookId::new(book),
            quantity,
            unit_price: Money::new(750, Currency::USD),
        }
    }

    #[test]
    fn test_lines_sql_is_one_insert() {
        let sql = lines_sql(OrderId::new(3), &[line(1, 2), line(2, 1)]).unwrap();
        assert!(sql.starts_with("INSERT INTO \"order_item\""));
        assert!(sql.contains("(3, 1, 2, 750), (3, 2, 1, 750)"));
        assert!(matches!(lines_sql(OrderId::new(3), &[]), Err(DbError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_writer_futures_are_send() {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let mut writer = SqliteOrderWriter::begin(db.pool()).await.unwrap();
        let order = NewOrder {
            user_id: UserId::new(1),
            total_amount: Money::new(750, Currency::USD),
        };
        assert_send(&writer.insert_header(&order));
        let lines = [line(1, 1)];
        assert_send(&writer.insert_lines(OrderId::new(1), &lines));
    }
}
