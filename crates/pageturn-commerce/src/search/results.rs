//! Listing results and pagination.

use crate::catalog::BookListing;
use serde::{Deserialize, Serialize};

/// One page of a listing plus the size of the whole result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// The rows on this page.
    pub items: Vec<T>,
    /// Number of distinct matches ignoring offset and limit.
    pub total_count: i64,
    /// Offset the page was requested at.
    pub offset: i64,
    /// Limit the page was requested with.
    pub limit: i64,
}

/// A page of book listings.
pub type BookPage = Page<BookListing>;

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, offset: i64, limit: i64) -> Self {
        Self {
            items,
            total_count,
            offset,
            limit,
        }
    }

    /// Create an empty page with a zero total.
    pub fn empty(offset: i64, limit: i64) -> Self {
        Self::new(Vec::new(), 0, offset, limit)
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if rows exist past this page.
    pub fn has_next(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total_count
    }

    /// Check if rows exist before this page.
    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// Transform every row, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            offset: self.offset,
            limit: self.limit,
        }
    }
}
