//! Category types for book organization.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A flat book category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Category description.
    pub description: Option<String>,
}

impl Category {
    /// Create a category with no description.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }
}
