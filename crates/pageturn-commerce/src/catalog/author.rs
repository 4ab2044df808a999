//! Author types.

use crate::ids::AuthorId;
use serde::{Deserialize, Serialize};

/// A book author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    /// Unique author identifier.
    pub id: AuthorId,
    /// Display name, searched case-insensitively.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
}

impl Author {
    /// Create an author with no biography.
    pub fn new(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bio: None,
        }
    }
}
