//! Order placement transaction.
//!
//! A placement moves through `Validating → Pricing → Persisting → Committed`.
//! Client mistakes end it in `Rejected` before anything is written; storage
//! failures end it in `Aborted` after the transaction is rolled back.

use crate::catalog::{resolve_price, Book};
use crate::checkout::{
    validate_quantity, NewOrder, Order, PendingLine, PlacementState, RequestedItem,
};
use crate::error::CommerceError;
use crate::ids::{BookId, OrderId, UserId};
use crate::money::Money;
use crate::store::{CatalogStore, OrderWriter};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Lines and total computed from one pricing snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<PendingLine>,
    pub total: Money,
}

/// Validate and price `items` against `books`.
///
/// Lines are examined in input order. A bad quantity fails at once; missing
/// books are collected so the caller hears about all of them together.
pub fn price_lines(
    items: &[RequestedItem],
    books: &HashMap<BookId, Book>,
    as_of: NaiveDate,
) -> Result<PricedOrder, CommerceError> {
    if items.is_empty() {
        return Err(CommerceError::EmptyOrder);
    }

    let mut unavailable: Vec<BookId> = Vec::new();
    let mut lines = Vec::with_capacity(items.len());
    let mut total: Option<Money> = None;

    for item in items {
        validate_quantity(item.book_id, item.quantity)?;

        let Some(book) = books.get(&item.book_id) else {
            if !unavailable.contains(&item.book_id) {
                unavailable.push(item.book_id);
            }
            continue;
        };

        let line = PendingLine {
            book_id: item.book_id,
            quantity: item.quantity,
            unit_price: resolve_price(book, as_of),
        };
        let line_total = line.line_total()?;
        total = Some(match total {
            Some(sum) => sum.checked_add(&line_total)?,
            None => line_total,
        });
        lines.push(line);
    }

    if !unavailable.is_empty() {
        return Err(CommerceError::ItemsUnavailable(unavailable));
    }

    let total = total.ok_or(CommerceError::EmptyOrder)?;
    Ok(PricedOrder { lines, total })
}

/// Place an order for `user_id`, priced as of `as_of`.
///
/// Books are read in one batch, which is the pricing snapshot for the whole
/// order. Header and lines are written in one transaction; on any write
/// failure it is rolled back and [`CommerceError::OrderPersistenceFailed`]
/// is returned. The committed order is reloaded and returned.
#[instrument(skip(store, items), fields(user_id = %user_id, item_count = items.len()))]
pub async fn place_order<S>(
    store: &S,
    user_id: UserId,
    items: &[RequestedItem],
    as_of: NaiveDate,
) -> Result<Order, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    let result = run_placement(store, user_id, items, as_of).await;
    if let Err(err) = &result {
        let state = PlacementState::for_error(err);
        match state {
            PlacementState::Aborted => warn!(state = %state, error = %err, "order placement failed"),
            _ => debug!(state = %state, error = %err, "order rejected"),
        }
    }
    result
}

async fn run_placement<S>(
    store: &S,
    user_id: UserId,
    items: &[RequestedItem],
    as_of: NaiveDate,
) -> Result<Order, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    debug!(state = %PlacementState::Validating);
    if items.is_empty() {
        return Err(CommerceError::EmptyOrder);
    }

    let mut seen = HashSet::new();
    let ids: Vec<BookId> = items
        .iter()
        .map(|item| item.book_id)
        .filter(|id| seen.insert(*id))
        .collect();
    let books: HashMap<BookId, Book> = store
        .get_books(&ids)
        .await?
        .into_iter()
        .map(|book| (book.id, book))
        .collect();

    debug!(state = %PlacementState::Pricing, books = books.len());
    let priced = price_lines(items, &books, as_of)?;

    debug!(state = %PlacementState::Persisting, total = %priced.total);
    let header = NewOrder {
        user_id,
        total_amount: priced.total,
    };
    let order_id = persist(store, &header, &priced.lines).await?;

    info!(
        state = %PlacementState::Committed,
        order_id = %order_id,
        total = %priced.total,
        "order placed"
    );

    store
        .get_order(order_id)
        .await?
        .ok_or_else(|| {
            CommerceError::OrderPersistenceFailed(format!("order {order_id} missing after commit"))
        })
}

async fn persist<S>(
    store: &S,
    header: &NewOrder,
    lines: &[PendingLine],
) -> Result<OrderId, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    let mut writer = store.begin_order().await.map_err(persistence_failed)?;

    let order_id = match write_order(writer.as_mut(), header, lines).await {
        Ok(id) => id,
        Err(err) => {
            if let Err(rollback_err) = writer.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            return Err(persistence_failed(err));
        }
    };

    writer.commit().await.map_err(persistence_failed)?;
    Ok(order_id)
}

async fn write_order(
    writer: &mut dyn OrderWriter,
    header: &NewOrder,
    lines: &[PendingLine],
) -> Result<OrderId, CommerceError> {
    let order_id = writer.insert_order(header).await?;
    writer.insert_order_items(order_id, lines).await?;
    Ok(order_id)
}

fn persistence_failed(err: CommerceError) -> CommerceError {
    match err {
        CommerceError::OrderPersistenceFailed(_) => err,
        other => CommerceError::OrderPersistenceFailed(other.to_string()),
    }
}

/// A user's orders with items, newest first.
#[instrument(skip(store), fields(user_id = %user_id))]
pub async fn list_orders<S>(store: &S, user_id: UserId) -> Result<Vec<Order>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    store.list_orders(user_id).await
}

/// Load an order with its items.
pub async fn get_order<S>(store: &S, order_id: OrderId) -> Result<Order, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    store
        .get_order(order_id)
        .await?
        .ok_or(CommerceError::NotFound {
            entity: "order",
            id: order_id.get(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{date, MemoryStore};

    const TODAY: (i32, u32, u32) = (2024, 5, 10);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    fn req(book: i64, quantity: i64) -> RequestedItem {
        RequestedItem::new(BookId::new(book), quantity)
    }

    #[tokio::test]
    async fn test_empty_order_touches_nothing() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let err = place_order(&store, UserId::new(1), &[], today())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::EmptyOrder));
        assert_eq!(store.calls(), 0);
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_discounted_price_times_quantity() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        store.add_discount(BookId::new(1), 750, date(2024, 5, 1), None);

        let order = place_order(&store, UserId::new(1), &[req(1, 3)], today())
            .await
            .unwrap();
        assert_eq!(order.total_amount.amount_cents, 2250);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price.amount_cents, 750);
        assert_eq!(order.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_discount_ending_today_still_applies() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        store.add_discount(BookId::new(1), 750, date(2024, 5, 1), Some(today()));

        let order = place_order(&store, UserId::new(1), &[req(1, 1)], today())
            .await
            .unwrap();
        assert_eq!(order.total_amount.amount_cents, 750);
    }

    #[tokio::test]
    async fn test_missing_books_reported_together() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let err = place_order(
            &store,
            UserId::new(1),
            &[req(1, 2), req(99, 1), req(42, 1), req(99, 2)],
            today(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.unavailable_ids(), &[BookId::new(99), BookId::new(42)]);
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_quantity_raised_immediately() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let err = place_order(&store, UserId::new(1), &[req(1, 9)], today())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InvalidQuantity { quantity: 9, .. }
        ));

        // A bad quantity wins over a missing book that comes before it.
        let err = place_order(&store, UserId::new(1), &[req(77, 1), req(1, 0)], today())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidQuantity { quantity: 0, .. }));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_one_batch_fetch() {
        let store = MemoryStore::with_books(&[("Dune", 1000), ("Emma", 800)]);
        place_order(&store, UserId::new(1), &[req(1, 1), req(2, 2), req(1, 1)], today())
            .await
            .unwrap();
        assert_eq!(store.batch_fetches(), 1);
    }

    #[tokio::test]
    async fn test_failed_line_insert_rolls_back_header() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        store.fail_order_items();

        let err = place_order(&store, UserId::new(1), &[req(1, 1)], today())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::OrderPersistenceFailed(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.public_message(), "internal error");
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_later_discount_edit_keeps_stored_price() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let discount = store.add_discount(BookId::new(1), 750, date(2024, 5, 1), None);

        let order = place_order(&store, UserId::new(1), &[req(1, 2)], today())
            .await
            .unwrap();
        store.set_discount_price(discount, 100);

        let reloaded = get_order(&store, order.id).await.unwrap();
        assert_eq!(reloaded.items[0].unit_price.amount_cents, 750);
        assert_eq!(reloaded.total_amount.amount_cents, 1500);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let user = UserId::new(4);
        let first = place_order(&store, user, &[req(1, 1)], today()).await.unwrap();
        let second = place_order(&store, user, &[req(1, 2)], today()).await.unwrap();
        place_order(&store, UserId::new(5), &[req(1, 1)], today())
            .await
            .unwrap();

        let orders = list_orders(&store, user).await.unwrap();
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let store = MemoryStore::new();
        let err = get_order(&store, OrderId::new(3)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_price_lines_overflow_is_an_error() {
        let mut books = HashMap::new();
        let book = crate::testing::book(1, "Huge", i64::MAX / 2);
        books.insert(book.id, book);
        let err = price_lines(&[req(1, 8)], &books, today()).unwrap_err();
        assert!(matches!(err, CommerceError::Overflow));
    }
}
