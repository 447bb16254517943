//! Stale lock detection
//!
//! A lock is **stale** when its battery was last checked strictly longer ago
//! than the freshness threshold (default 30 days):
//!
//! `now - last_battery_check > threshold`
//!
//! A lock checked exactly `threshold` ago is still fresh. Records whose
//! timestamp cannot be parsed are never stale; they are returned in
//! [`StaleLockReport::malformed`] so the caller can report them.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ValidationError;
use crate::lock::LockRecord;

/// Default freshness threshold in days.
pub const DEFAULT_THRESHOLD_DAYS: u32 = 30;

/// A lock record that was skipped because its timestamp is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRecord {
    pub lock_id: String,
    pub raw_timestamp: String,
    pub reason: String,
}

/// Result of filtering a batch of lock records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleLockReport {
    /// Stale records, in input order
    pub stale: Vec<LockRecord>,
    /// Records excluded because their timestamp did not parse
    pub malformed: Vec<MalformedRecord>,
}

/// Filter selecting locks whose battery check is older than a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleLockFilter {
    threshold: Duration,
}

impl Default for StaleLockFilter {
    fn default() -> Self {
        Self {
            threshold: Duration::days(DEFAULT_THRESHOLD_DAYS as i64),
        }
    }
}

impl StaleLockFilter {
    /// Create a filter with the default 30 day threshold
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter with a custom threshold.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] if `threshold` is negative.
    pub fn with_threshold(threshold: Duration) -> Result<Self, ValidationError> {
        if threshold < Duration::zero() {
            return Err(ValidationError::InvalidValue {
                field: "threshold".to_string(),
                message: format!("must not be negative, got {threshold}"),
            });
        }
        Ok(Self { threshold })
    }

    pub fn with_threshold_days(days: u32) -> Self {
        Self {
            threshold: Duration::days(days as i64),
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Whether a lock checked at `checked_at` is stale as of `now`.
    pub fn is_stale(&self, checked_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(checked_at) > self.threshold
    }

    /// Split `locks` into stale records and malformed records.
    ///
    /// Input order is preserved in both lists. Fresh records appear in
    /// neither.
    pub fn filter_stale(&self, locks: &[LockRecord], now: DateTime<Utc>) -> StaleLockReport {
        let mut report = StaleLockReport::default();

        for lock in locks {
            match parse_check_timestamp(&lock.last_battery_check) {
                Ok(checked_at) => {
                    if self.is_stale(checked_at, now) {
                        report.stale.push(lock.clone());
                    }
                }
                Err(reason) => {
                    warn!(
                        lock_id = %lock.lock_id,
                        raw = %lock.last_battery_check,
                        "skipping lock with malformed battery check timestamp: {reason}"
                    );
                    report.malformed.push(MalformedRecord {
                        lock_id: lock.lock_id.clone(),
                        raw_timestamp: lock.last_battery_check.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }
}

/// SQLite's `datetime()` / `CURRENT_TIMESTAMP` text form, always UTC.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a registry timestamp.
///
/// Accepts RFC 3339 with any offset, SQLite's `YYYY-MM-DD HH:MM:SS` read as
/// UTC, or a bare `YYYY-MM-DD` date taken as midnight UTC.
pub fn parse_check_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("timestamp is empty".to_string());
    }

    let rfc_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, SQLITE_DATETIME_FORMAT) {
        return Ok(naive.and_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("not an RFC 3339 timestamp or date: {rfc_err}"))
}
