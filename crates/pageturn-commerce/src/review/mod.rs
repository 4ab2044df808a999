//! Book review module.

mod review;

pub use review::{
    create_review, delete_review, list_reviews, NewReview, Review, ReviewDraft, ReviewQuery,
    ReviewSort, DEFAULT_REVIEW_PAGE_SIZE, MAX_TITLE_LEN,
};
