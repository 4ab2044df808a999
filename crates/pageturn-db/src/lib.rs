//! SQLite catalog store for Pageturn.
//!
//! Implements [`pageturn_commerce::store::CatalogStore`] with an `sqlx` pool
//! and `sea-query` statements. Listings are composed set-based: one query
//! per page and one for the distinct total count.
//!
//! # Example
//!
//! ```rust,ignore
//! use pageturn_db::{Db, SqliteCatalogStore};
//! use pageturn_commerce::prelude::*;
//!
//! let db = Db::open("sqlite://pageturn.db", 5).await?;
//! db.migrate().await?;
//! let store = SqliteCatalogStore::new(&db, Currency::USD);
//!
//! let page = list_books(&store, &BookQuery::new(), today()).await?;
//! ```

mod books;
mod carts;
mod db;
mod error;
mod orders;
mod reviews;
mod rows;
mod schema;
mod seed;
mod store;

pub use db::Db;
pub use error::{DbError, Result};
pub use orders::SqliteOrderWriter;
pub use seed::{NewBook, NewDiscount};
pub use store::SqliteCatalogStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, NewBook, NewDiscount, SqliteCatalogStore};
}
