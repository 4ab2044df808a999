//! Listing query builder.

use crate::error::CommerceError;
use crate::ids::{AuthorId, CategoryId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size used when a book listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Page size used for category and author listings.
pub const DEFAULT_LOOKUP_PAGE_SIZE: i64 = 100;

/// Largest page any listing will return.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort keys for book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Discounted books first, then cheapest first.
    #[default]
    OnSale,
    /// Only discounted books, biggest saving first.
    OnSaleHome,
    /// Most reviewed first.
    #[serde(alias = "popular")]
    Popularity,
    /// Best rated first.
    Recommended,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::OnSale => "on_sale",
            SortKey::OnSaleHome => "on_sale_home",
            SortKey::Popularity => "popularity",
            SortKey::Recommended => "recommended",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::OnSale => "On Sale",
            SortKey::OnSaleHome => "Best Deals",
            SortKey::Popularity => "Most Popular",
            SortKey::Recommended => "Highest Rated",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
        }
    }

    /// Check if this key restricts results to discounted books.
    pub fn restricts_to_discounted(&self) -> bool {
        matches!(self, SortKey::OnSaleHome)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on_sale" => Ok(SortKey::OnSale),
            "on_sale_home" => Ok(SortKey::OnSaleHome),
            "popularity" | "popular" => Ok(SortKey::Popularity),
            "recommended" => Ok(SortKey::Recommended),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            other => Err(CommerceError::Validation(format!("unknown sort key: {other}"))),
        }
    }
}

/// Optional narrowing applied to a listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BookFilters {
    pub category_id: Option<CategoryId>,
    pub author_id: Option<AuthorId>,
    /// Minimum average rating, 1 to 5. Unreviewed books count as 0.
    pub min_rating: Option<i64>,
    /// Substring matched against title or author name, ignoring case.
    pub search: Option<String>,
}

impl BookFilters {
    /// Check if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.author_id.is_none()
            && self.min_rating.is_none()
            && self.search.is_none()
    }

    /// The `LIKE` pattern for the search term, if one is set.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// Offset and limit for a paged listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Reject a negative offset or a limit outside `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.offset < 0 {
            return Err(CommerceError::Validation(format!(
                "offset must be non-negative, got {}",
                self.offset
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.limit) {
            return Err(CommerceError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_LOOKUP_PAGE_SIZE)
    }
}

/// A book listing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookQuery {
    pub filters: BookFilters,
    pub sort: SortKey,
    pub offset: i64,
    pub limit: i64,
}

impl BookQuery {
    /// Create a query for the first page, sorted by [`SortKey::OnSale`].
    pub fn new() -> Self {
        Self {
            filters: BookFilters::default(),
            sort: SortKey::OnSale,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// Restrict to a category.
    pub fn with_category(mut self, id: CategoryId) -> Self {
        self.filters.category_id = Some(id);
        self
    }

    /// Restrict to an author.
    pub fn with_author(mut self, id: AuthorId) -> Self {
        self.filters.author_id = Some(id);
        self
    }

    /// Require a minimum average rating.
    pub fn with_min_rating(mut self, rating: i64) -> Self {
        self.filters.min_rating = Some(rating);
        self
    }

    /// Set the search term. A blank term clears the filter.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.filters.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self
    }

    /// Set sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Set offset and limit.
    pub fn with_page(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.offset, self.limit)
    }

    /// Check every input against its allowed range.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if let Some(rating) = self.filters.min_rating {
            if !(1..=5).contains(&rating) {
                return Err(CommerceError::Validation(format!(
                    "min_rating must be between 1 and 5, got {rating}"
                )));
            }
        }
        self.page().validate()
    }
}

impl Default for BookQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// A title/author search request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleSearch {
    pub term: String,
    pub offset: i64,
    pub limit: i64,
}

impl TitleSearch {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set offset and limit.
    pub fn with_page(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Check if the term has nothing to match on.
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }

    pub fn pattern(&self) -> String {
        like_pattern(self.term.trim())
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.offset, self.limit)
    }
}

/// Escape character for patterns built by [`like_pattern`].
pub const LIKE_ESCAPE: char = '!';

/// Build a lowercase `%term%` pattern that matches `%` and `_` literally.
///
/// Wildcards in the term are prefixed with [`LIKE_ESCAPE`], which must be
/// passed as the `ESCAPE` character of the `LIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
