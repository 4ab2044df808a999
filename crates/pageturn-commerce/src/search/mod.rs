//! Book listing and search module.
//!
//! Contains the query types the storefront sends, the page container the
//! store returns, and the engine functions that validate a request before
//! handing it to a [`crate::store::CatalogStore`].

mod engine;
mod query;
mod results;

pub use engine::{get_book_details, list_authors, list_books, list_categories, search_books};
pub use query::{
    like_pattern, BookFilters, BookQuery, PageRequest, SortKey, TitleSearch,
    DEFAULT_LOOKUP_PAGE_SIZE, DEFAULT_PAGE_SIZE, LIKE_ESCAPE, MAX_PAGE_SIZE,
};
pub use results::{BookPage, Page};
