//! Lock registry and user directory access.
//!
//! The campaign reads everything it needs through [`DataSource`]. Which
//! implementation backs it is chosen once, from configuration, before the
//! run starts: there is no implicit fallback from one to the other.

mod fixture;
mod live;

pub use fixture::FixtureSource;
pub use live::LiveSource;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SourceError;
use crate::lock::{LockRecord, LockUser};

/// Read access to locks, their users, and observed opens.
pub trait DataSource {
    /// Short identifier used in logs (e.g. "fixture", "live").
    fn name(&self) -> &str;

    /// All locks known to the registry.
    fn locks(&self) -> Result<Vec<LockRecord>, SourceError>;

    /// Users attached to `lock_id`. Unknown locks yield an empty list.
    fn users_for_lock(&self, lock_id: &str) -> Result<Vec<LockUser>, SourceError>;

    /// `(user_id, lock_id)` pairs that opened a notification of this campaign.
    fn recorded_opens(&self, _campaign_tag: &str) -> Result<Vec<(String, String)>, SourceError> {
        Ok(Vec::new())
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn locks(&self) -> Result<Vec<LockRecord>, SourceError> {
        (**self).locks()
    }

    fn users_for_lock(&self, lock_id: &str) -> Result<Vec<LockUser>, SourceError> {
        (**self).users_for_lock(lock_id)
    }

    fn recorded_opens(&self, campaign_tag: &str) -> Result<Vec<(String, String)>, SourceError> {
        (**self).recorded_opens(campaign_tag)
    }
}

/// Which [`DataSource`] to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Built-in sample registry
    #[default]
    Fixture,
    /// SQLite registry on disk
    Live,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Fixture => f.write_str("fixture"),
            SourceMode::Live => f.write_str("live"),
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixture" | "mock" => Ok(SourceMode::Fixture),
            "live" | "real" => Ok(SourceMode::Live),
            other => Err(format!("unknown source mode '{other}' (expected fixture or live)")),
        }
    }
}
