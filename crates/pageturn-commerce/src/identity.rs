//! The caller identity handed in by the authentication layer.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// A verified caller. Trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub user_id: UserId,
    #[serde(default)]
    pub is_admin: bool,
}

impl Customer {
    /// A regular customer.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// An administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Check if this caller may act on something owned by `owner`.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_manage() {
        let owner = UserId::new(1);
        assert!(Customer::new(owner).can_manage(owner));
        assert!(!Customer::new(UserId::new(2)).can_manage(owner));
        assert!(Customer::admin(UserId::new(2)).can_manage(owner));
    }
}
