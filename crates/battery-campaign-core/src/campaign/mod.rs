//! Battery check campaign
//!
//! This module holds the decision logic of a campaign run: which locks are
//! stale, what was sent and opened, and how engaged users were. The
//! [`Campaign`] orchestrator ties these to a data source and a notifier.

mod engagement;
mod ledger;
mod runner;
mod stale_filter;

use chrono::{DateTime, Utc};

pub use engagement::{CampaignSummary, EngagementCalculator, Interpretation};

pub use ledger::{CampaignLedger, NotificationEvent, NotificationKind};

pub use runner::{Campaign, CampaignReport, FailedDelivery, SkippedLock};

pub use stale_filter::{
    parse_check_timestamp, MalformedRecord, StaleLockFilter, StaleLockReport,
    DEFAULT_THRESHOLD_DAYS,
};

/// Tag grouping the events of one run, e.g. `battery_check_2024-03-01`.
pub fn campaign_tag(now: DateTime<Utc>) -> String {
    format!("battery_check_{}", now.format("%Y-%m-%d"))
}
