use std::collections::HashMap;

use super::DataSource;
use crate::error::SourceError;
use crate::lock::{LockRecord, LockUser};

/// In-memory registry.
///
/// [`FixtureSource::sample`] holds the two-lock sample registry used when no
/// live registry is configured.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    locks: Vec<LockRecord>,
    users: HashMap<String, Vec<LockUser>>,
    opens: Vec<(String, String)>,
}

impl FixtureSource {
    pub fn new(
        locks: Vec<LockRecord>,
        users: HashMap<String, Vec<LockUser>>,
        opens: Vec<(String, String)>,
    ) -> Self {
        Self { locks, users, opens }
    }

    pub fn sample() -> Self {
        let locks = vec![
            LockRecord::new("L001", "2023-12-01T00:00:00Z"),
            LockRecord::new("L002", "2024-01-10T00:00:00Z"),
        ];

        let mut users = HashMap::new();
        users.insert(
            "L001".to_string(),
            vec![
                LockUser::new("U001", "token_111"),
                LockUser::new("U002", "token_222"),
            ],
        );
        users.insert("L002".to_string(), vec![LockUser::new("U003", "token_333")]);

        let opens = vec![
            ("U001".to_string(), "L001".to_string()),
            ("U003".to_string(), "L002".to_string()),
        ];

        Self::new(locks, users, opens)
    }
}

impl DataSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    fn locks(&self) -> Result<Vec<LockRecord>, SourceError> {
        Ok(self.locks.clone())
    }

    fn users_for_lock(&self, lock_id: &str) -> Result<Vec<LockUser>, SourceError> {
        Ok(self.users.get(lock_id).cloned().unwrap_or_default())
    }

    fn recorded_opens(&self, _campaign_tag: &str) -> Result<Vec<(String, String)>, SourceError> {
        Ok(self.opens.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_two_locks_and_three_users() {
        let source = FixtureSource::sample();
        let locks = source.locks().unwrap();
        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0].lock_id, "L001");

        assert_eq!(source.users_for_lock("L001").unwrap().len(), 2);
        assert_eq!(source.users_for_lock("L002").unwrap()[0].push_token, "token_333");
    }

    #[test]
    fn unknown_lock_has_no_users() {
        let source = FixtureSource::sample();
        assert!(source.users_for_lock("L404").unwrap().is_empty());
    }

    #[test]
    fn default_is_empty() {
        let source = FixtureSource::default();
        assert!(source.locks().unwrap().is_empty());
        assert!(source.recorded_opens("any").unwrap().is_empty());
    }
}
