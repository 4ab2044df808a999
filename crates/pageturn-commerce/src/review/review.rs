//! Review types and operations.

use crate::error::CommerceError;
use crate::identity::Customer;
use crate::ids::{BookId, ReviewId, UserId};
use crate::search::PageRequest;
use crate::store::CatalogStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Longest allowed review title, in characters.
pub const MAX_TITLE_LEN: usize = 120;

/// Page size used when a review listing does not ask for one.
pub const DEFAULT_REVIEW_PAGE_SIZE: i64 = 10;

/// A stored review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub title: String,
    pub details: Option<String>,
    /// Star rating, 1 to 5.
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

/// What a customer submits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDraft {
    pub title: String,
    pub details: Option<String>,
    pub rating: i64,
}

impl ReviewDraft {
    pub fn new(title: impl Into<String>, rating: i64) -> Self {
        Self {
            title: title.into(),
            details: None,
            rating,
        }
    }

    /// Attach body text.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validate(&self) -> Result<(), CommerceError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CommerceError::Validation(
                "review title must not be empty".into(),
            ));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(CommerceError::Validation(format!(
                "review title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(CommerceError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

/// A validated review ready to insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReview {
    pub book_id: BookId,
    pub user_id: UserId,
    pub title: String,
    pub details: Option<String>,
    pub rating: i64,
}

/// Review listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
}

impl ReviewSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewSort::DateDesc => "date_desc",
            ReviewSort::DateAsc => "date_asc",
        }
    }
}

impl fmt::Display for ReviewSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewSort {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date_desc" => Ok(ReviewSort::DateDesc),
            "date_asc" => Ok(ReviewSort::DateAsc),
            other => Err(CommerceError::Validation(format!(
                "unknown review sort: {other}"
            ))),
        }
    }
}

/// A review listing request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewQuery {
    pub sort: ReviewSort,
    /// Only reviews with exactly this rating.
    pub rating: Option<i64>,
    pub offset: i64,
    pub limit: i64,
}

impl ReviewQuery {
    pub fn new() -> Self {
        Self {
            sort: ReviewSort::DateDesc,
            rating: None,
            offset: 0,
            limit: DEFAULT_REVIEW_PAGE_SIZE,
        }
    }

    pub fn with_sort(mut self, sort: ReviewSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_page(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), CommerceError> {
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(CommerceError::Validation(format!(
                    "rating must be between 1 and 5, got {rating}"
                )));
            }
        }
        PageRequest::new(self.offset, self.limit).validate()
    }
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Reviews for a book. The book must exist.
#[instrument(skip(store, query), fields(sort = %query.sort))]
pub async fn list_reviews<S>(
    store: &S,
    book_id: BookId,
    query: &ReviewQuery,
) -> Result<Vec<Review>, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    query.validate()?;
    if !store.book_exists(book_id).await? {
        return Err(CommerceError::book_not_found(book_id));
    }
    store.list_reviews(book_id, query).await
}

/// Store a review by `author` for `book_id`.
#[instrument(skip(store, draft), fields(user_id = %author.user_id))]
pub async fn create_review<S>(
    store: &S,
    book_id: BookId,
    author: &Customer,
    draft: &ReviewDraft,
) -> Result<Review, CommerceError>
where
    S: CatalogStore + ?Sized,
{
    draft.validate()?;
    if !store.book_exists(book_id).await? {
        return Err(CommerceError::book_not_found(book_id));
    }
    let review = store
        .insert_review(&NewReview {
            book_id,
            user_id: author.user_id,
            title: draft.title.trim().to_string(),
            details: draft.details.clone(),
            rating: draft.rating,
        })
        .await?;
    info!(review_id = %review.id, "review created");
    Ok(review)
}

/// Delete a review. Only its author or an admin may do so.
#[instrument(skip(store), fields(user_id = %actor.user_id))]
pub async fn delete_review<S>(
    store: &S,
    book_id: BookId,
    review_id: ReviewId,
    actor: &Customer,
) -> Result<(), CommerceError>
where
    S: CatalogStore + ?Sized,
{
    let not_found = || CommerceError::NotFound {
        entity: "review",
        id: review_id.get(),
    };

    let review = store
        .get_review(review_id)
        .await?
        .filter(|r| r.book_id == book_id)
        .ok_or_else(not_found)?;

    if !actor.can_manage(review.user_id) {
        return Err(CommerceError::Forbidden(
            "not authorized to delete this review".into(),
        ));
    }

    if !store.delete_review(review_id).await? {
        return Err(not_found());
    }
    info!(review_id = %review_id, "review deleted");
    Ok(())
}
