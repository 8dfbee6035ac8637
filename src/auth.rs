//! Admin allow-list
//!
//! Loaded once at startup from configuration. Gated entry points call
//! [`AdminList::is_admin`] at invocation time, every time; there is no
//! session-level caching of the answer.

use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct AdminList {
    ids: HashSet<i64>,
}

impl AdminList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        let allowed = self.ids.contains(&user_id);
        tracing::debug!(user_id, allowed, "admin check");
        allowed
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        let admins = AdminList::new([10, 20]);
        assert!(admins.is_admin(10));
        assert!(admins.is_admin(20));
        assert!(!admins.is_admin(30));
    }

    #[test]
    fn empty_list_denies_everyone() {
        let admins = AdminList::new([]);
        assert!(admins.is_empty());
        assert!(!admins.is_admin(1));
    }
}
