//! Cart types and operations.

use crate::checkout::validate_quantity;
use crate::error::CommerceError;
use crate::ids::{BookId, UserId};
use crate::store::CatalogStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

/// A stored cart entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub user_id: UserId,
    pub book_id: BookId,
    pub quantity: i64,
}

/// A requested cart entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub book_id: BookId,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(book_id: BookId, quantity: i64) -> Self {
        Self { book_id, quantity }
    }
}

/// Check quantities and reject duplicate books.
pub fn validate_lines(lines: &[CartLine]) -> Result<(), CommerceError> {
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        validate_quantity(line.book_id, line.quantity)?;
        if !seen.insert(line.book_id) {
            return Err(CommerceError::Validation(format!(
                "book {} appears more than once in the cart",
                line.book_id
            )));
        }
    }
    Ok(())
}

/// A user's cart, ordered by book id.
pub async fn get_cart<S>(store: &S, user_id: UserId) -> Result<Vec<CartItem>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    store.get_cart(user_id).await
}

/// Replace a user's cart with `lines`.
///
/// An empty list clears the cart. Every book must exist.
#[instrument(skip(store, lines), fields(user_id = %user_id, item_count = lines.len()))]
pub async fn replace_cart<S>(
    store: &S,
    user_id: UserId,
    lines: &[CartLine],
) -> Result<Vec<CartItem>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    validate_lines(lines)?;

    if !lines.is_empty() {
        let ids: Vec<BookId> = lines.iter().map(|l| l.book_id).collect();
        let found: HashSet<BookId> = store
            .get_books(&ids)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect();
        let missing: Vec<BookId> = ids.into_iter().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(CommerceError::ItemsUnavailable(missing));
        }
    }

    store.replace_cart(user_id, lines).await?;
    info!("cart replaced");
    store.get_cart(user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn line(book: i64, quantity: i64) -> CartLine {
        CartLine::new(BookId::new(book), quantity)
    }

    #[test]
    fn test_validate_lines() {
        assert!(validate_lines(&[line(1, 1), line(2, 8)]).is_ok());
        assert!(validate_lines(&[]).is_ok());
        assert!(matches!(
            validate_lines(&[line(1, 9)]),
            Err(CommerceError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            validate_lines(&[line(1, 1), line(1, 2)]),
            Err(CommerceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_cart_swaps_contents() {
        let store = MemoryStore::with_books(&[("Dune", 1000), ("Emma", 900), ("Ulysses", 1500)]);
        let user = UserId::new(7);

        replace_cart(&store, user, &[line(1, 2), line(2, 1)]).await.unwrap();
        let cart = replace_cart(&store, user, &[line(3, 4)]).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].book_id, BookId::new(3));
        assert_eq!(cart[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_replace_cart_rejects_missing_books() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let user = UserId::new(7);
        replace_cart(&store, user, &[line(1, 1)]).await.unwrap();

        let err = replace_cart(&store, user, &[line(1, 1), line(5, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.unavailable_ids(), &[BookId::new(5)]);

        // The old cart survives a rejected update.
        assert_eq!(get_cart(&store, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_update_clears_cart() {
        let store = MemoryStore::with_books(&[("Dune", 1000)]);
        let user = UserId::new(7);
        replace_cart(&store, user, &[line(1, 1)]).await.unwrap();
        assert!(replace_cart(&store, user, &[]).await.unwrap().is_empty());
    }
}
