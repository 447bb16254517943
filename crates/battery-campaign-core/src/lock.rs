//! Lock registry records and the users attached to them.

use serde::{Deserialize, Serialize};

/// Snapshot of one lock as reported by the registry.
///
/// `last_battery_check` is kept as the raw text the registry returned so
/// that unparseable values can be reported back to the caller instead of
/// being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub lock_id: String,
    pub last_battery_check: String,
}

impl LockRecord {
    pub fn new(lock_id: impl Into<String>, last_battery_check: impl Into<String>) -> Self {
        Self {
            lock_id: lock_id.into(),
            last_battery_check: last_battery_check.into(),
        }
    }
}

/// A user associated with a lock, with the token used for push delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockUser {
    pub user_id: String,
    pub push_token: String,
}

impl LockUser {
    pub fn new(user_id: impl Into<String>, push_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            push_token: push_token.into(),
        }
    }
}
