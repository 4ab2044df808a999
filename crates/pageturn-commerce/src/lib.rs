//! Bookstore domain types and logic for Pageturn.
//!
//! This crate holds everything about the store that does not depend on a
//! particular database:
//!
//! - **Catalog**: Books, authors, categories, discounts and price resolution
//! - **Search**: Listing queries, sort keys, pagination
//! - **Checkout**: Order placement as one atomic transaction
//! - **Cart** and **Review**: Per-user carts and book reviews
//!
//! Storage is reached through the [`store::CatalogStore`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use pageturn_commerce::prelude::*;
//!
//! let page = list_books(&store, &BookQuery::new().with_sort(SortKey::PriceAsc), today()).await?;
//! println!("{} of {} books", page.len(), page.total_count);
//!
//! let order = place_order(
//!     &store,
//!     UserId::new(1),
//!     &[RequestedItem::new(BookId::new(3), 2)],
//!     today(),
//! )
//! .await?;
//! println!("Total: {}", order.total_amount.display());
//! ```

pub mod error;
pub mod identity;
pub mod ids;
pub mod money;
pub mod store;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod review;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::identity::Customer;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::store::{CatalogStore, OrderWriter};

    // Catalog
    pub use crate::catalog::{
        active_discount, resolve_price, today, Author, Book, BookDetails, BookListing, Category,
        Discount,
    };

    // Search
    pub use crate::search::{
        get_book_details, list_authors, list_books, list_categories, search_books, BookFilters,
        BookPage, BookQuery, Page, PageRequest, SortKey, TitleSearch,
    };

    // Checkout
    pub use crate::checkout::{
        get_order, list_orders, place_order, NewOrder, Order, OrderItem, PendingLine,
        RequestedItem,
    };

    // Cart
    pub use crate::cart::{get_cart, replace_cart, CartItem, CartLine};

    // Reviews
    pub use crate::review::{
        create_review, delete_review, list_reviews, NewReview, Review, ReviewDraft, ReviewQuery,
        ReviewSort,
    };
}
