//! Catalog query engine.
//!
//! Every function validates its input before the first store call, so a bad
//! request never costs a round trip.

use crate::catalog::{Author, BookDetails, Category};
use crate::error::CommerceError;
use crate::ids::BookId;
use crate::search::{BookPage, BookQuery, Page, PageRequest, TitleSearch};
use crate::store::CatalogStore;
use chrono::NaiveDate;
use tracing::{debug, instrument};

/// List books matching `query`, priced as of `as_of`.
///
/// `total_count` is the number of distinct matching books before paging.
/// For [`crate::search::SortKey::OnSaleHome`] it is also taken before the
/// discounted-only restriction, so it can exceed the rows actually reachable.
#[instrument(
    skip(store, query),
    fields(sort = %query.sort, offset = query.offset, limit = query.limit)
)]
pub async fn list_books<S>(
    store: &S,
    query: &BookQuery,
    as_of: NaiveDate,
) -> Result<BookPage, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    query.validate()?;
    let page = store.query_books(query, as_of).await?;
    debug!(
        returned = page.len(),
        total_count = page.total_count,
        "book listing resolved"
    );
    Ok(page)
}

/// Search titles and author names.
///
/// A blank term yields an empty page without querying the store.
#[instrument(skip(store, search), fields(offset = search.offset, limit = search.limit))]
pub async fn search_books<S>(
    store: &S,
    search: &TitleSearch,
    as_of: NaiveDate,
) -> Result<BookPage, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    search.page().validate()?;
    if search.is_blank() {
        debug!("blank search term");
        return Ok(Page::empty(search.offset, search.limit));
    }
    let page = store.search_books(search, as_of).await?;
    debug!(returned = page.len(), total_count = page.total_count, "search resolved");
    Ok(page)
}

/// Load one book with its author, category, discounts and resolved price.
#[instrument(skip(store))]
pub async fn get_book_details<S>(
    store: &S,
    book_id: BookId,
    as_of: NaiveDate,
) -> Result<BookDetails, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    store
        .get_book(book_id, as_of)
        .await?
        .ok_or_else(|| CommerceError::book_not_found(book_id))
}

pub async fn list_categories<S>(store: &S, page: PageRequest) -> Result<Vec<Category>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    page.validate()?;
    store.list_categories(page).await
}

pub async fn list_authors<S>(store: &S, page: PageRequest) -> Result<Vec<Author>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    page.validate()?;
    store.list_authors(page).await
}
