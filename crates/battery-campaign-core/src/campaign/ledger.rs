//! Per-run record of sent and opened notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::engagement::{CampaignSummary, EngagementCalculator};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Sent,
    Opened,
}

/// One sent or opened notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user_id: String,
    pub lock_id: String,
    pub campaign_tag: String,
    pub timestamp: DateTime<Utc>,
    pub kind: NotificationKind,
}

/// Events accumulated during a single campaign run.
///
/// An open is only counted against a matching, not yet opened, sent
/// notification, so `opened_count() <= sent_count()` always holds.
#[derive(Debug, Clone)]
pub struct CampaignLedger {
    campaign_tag: String,
    events: Vec<NotificationEvent>,
}

impl CampaignLedger {
    pub fn new(campaign_tag: impl Into<String>) -> Self {
        Self {
            campaign_tag: campaign_tag.into(),
            events: Vec::new(),
        }
    }

    pub fn campaign_tag(&self) -> &str {
        &self.campaign_tag
    }

    pub fn record_sent(
        &mut self,
        user_id: &str,
        lock_id: &str,
        at: DateTime<Utc>,
    ) -> &NotificationEvent {
        self.push(user_id, lock_id, at, NotificationKind::Sent)
    }

    /// Record that a user opened the notification for a lock.
    ///
    /// Returns `None` (and records nothing) if no notification was sent to
    /// that user for that lock, or if it was already opened.
    pub fn record_opened(
        &mut self,
        user_id: &str,
        lock_id: &str,
        at: DateTime<Utc>,
    ) -> Option<&NotificationEvent> {
        let sent = self.count_matching(user_id, lock_id, NotificationKind::Sent);
        let opened = self.count_matching(user_id, lock_id, NotificationKind::Opened);
        if opened >= sent {
            warn!(
                campaign_tag = %self.campaign_tag,
                user_id, lock_id, "ignoring open without a matching sent notification"
            );
            return None;
        }
        Some(self.push(user_id, lock_id, at, NotificationKind::Opened))
    }

    pub fn sent_count(&self) -> u64 {
        self.count_kind(NotificationKind::Sent)
    }

    pub fn opened_count(&self) -> u64 {
        self.count_kind(NotificationKind::Opened)
    }

    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<NotificationEvent> {
        self.events
    }

    /// Summarize the ledger with the given calculator.
    pub fn summarize(
        &self,
        calculator: &EngagementCalculator,
    ) -> Result<CampaignSummary, ValidationError> {
        calculator.summarize(&self.campaign_tag, self.sent_count(), self.opened_count())
    }

    fn push(
        &mut self,
        user_id: &str,
        lock_id: &str,
        at: DateTime<Utc>,
        kind: NotificationKind,
    ) -> &NotificationEvent {
        self.events.push(NotificationEvent {
            user_id: user_id.to_string(),
            lock_id: lock_id.to_string(),
            campaign_tag: self.campaign_tag.clone(),
            timestamp: at,
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    fn count_kind(&self, kind: NotificationKind) -> u64 {
        self.events.iter().filter(|e| e.kind == kind).count() as u64
    }

    fn count_matching(&self, user_id: &str, lock_id: &str, kind: NotificationKind) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == kind && e.user_id == user_id && e.lock_id == lock_id)
            .count()
    }
}
