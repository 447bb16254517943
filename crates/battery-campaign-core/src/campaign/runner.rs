//! Campaign orchestration.
//!
//! One call to [`Campaign::run`] performs a full battery check campaign:
//! list locks, keep the stale ones, notify every user of every stale lock,
//! replay observed opens and summarize. Listing locks is the only step whose
//! failure aborts the run; a failed user lookup skips that lock and a failed
//! delivery skips that user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::engagement::{CampaignSummary, EngagementCalculator};
use super::ledger::{CampaignLedger, NotificationEvent};
use super::stale_filter::{MalformedRecord, StaleLockFilter};
use super::campaign_tag;
use crate::error::Result;
use crate::lock::LockRecord;
use crate::notify::{NotificationPayload, Notifier};
use crate::source::DataSource;

/// A lock whose users could not be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLock {
    pub lock_id: String,
    pub reason: String,
}

/// A notification that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDelivery {
    pub user_id: String,
    pub lock_id: String,
    pub reason: String,
}

/// Everything one campaign run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub summary: CampaignSummary,
    pub stale_locks: Vec<LockRecord>,
    pub malformed: Vec<MalformedRecord>,
    pub skipped_locks: Vec<SkippedLock>,
    pub failed_deliveries: Vec<FailedDelivery>,
    pub events: Vec<NotificationEvent>,
}

/// A configured campaign: where locks come from, how notifications go out,
/// and how staleness and engagement are judged.
pub struct Campaign<S, N> {
    source: S,
    notifier: N,
    filter: StaleLockFilter,
    calculator: EngagementCalculator,
}

impl<S: DataSource, N: Notifier> Campaign<S, N> {
    pub fn new(source: S, notifier: N) -> Self {
        Self {
            source,
            notifier,
            filter: StaleLockFilter::default(),
            calculator: EngagementCalculator::default(),
        }
    }

    pub fn with_filter(mut self, filter: StaleLockFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_calculator(mut self, calculator: EngagementCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the campaign once as of `now`.
    ///
    /// # Errors
    /// Returns an error if the lock list cannot be read, or if the recorded
    /// events fail summary validation.
    pub fn run(&self, now: DateTime<Utc>) -> Result<CampaignReport> {
        let tag = campaign_tag(now);
        info!(
            campaign_tag = %tag,
            source = self.source.name(),
            notifier = self.notifier.name(),
            "starting campaign"
        );

        let locks = self.source.locks()?;
        let filtered = self.filter.filter_stale(&locks, now);
        info!(
            total = locks.len(),
            stale = filtered.stale.len(),
            malformed = filtered.malformed.len(),
            "filtered locks"
        );

        let mut ledger = CampaignLedger::new(tag.clone());
        let mut skipped_locks = Vec::new();
        let mut failed_deliveries = Vec::new();

        for lock in &filtered.stale {
            let users = match self.source.users_for_lock(&lock.lock_id) {
                Ok(users) => users,
                Err(e) => {
                    warn!(lock_id = %lock.lock_id, "skipping lock, user lookup failed: {e}");
                    skipped_locks.push(SkippedLock {
                        lock_id: lock.lock_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if users.is_empty() {
                debug!(lock_id = %lock.lock_id, "stale lock has no users");
            }

            let payload =
                NotificationPayload::battery_check(&lock.lock_id, &tag, self.filter.threshold());
            for user in &users {
                match self.notifier.send(user, &payload) {
                    Ok(_receipt) => {
                        ledger.record_sent(&user.user_id, &lock.lock_id, now);
                    }
                    Err(e) => {
                        warn!(
                            user_id = %user.user_id,
                            lock_id = %lock.lock_id,
                            "delivery failed: {e}"
                        );
                        failed_deliveries.push(FailedDelivery {
                            user_id: user.user_id.clone(),
                            lock_id: lock.lock_id.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        match self.source.recorded_opens(&tag) {
            Ok(opens) => {
                for (user_id, lock_id) in opens {
                    ledger.record_opened(&user_id, &lock_id, now);
                }
            }
            Err(e) => warn!(campaign_tag = %tag, "could not read recorded opens: {e}"),
        }

        let summary = ledger.summarize(&self.calculator)?;
        info!(
            campaign_tag = %summary.campaign_tag,
            sent = summary.sent_count,
            opened = summary.opened_count,
            open_rate = %summary.open_rate_display(),
            interpretation = %summary.interpretation,
            "campaign finished"
        );

        Ok(CampaignReport {
            summary,
            stale_locks: filtered.stale,
            malformed: filtered.malformed,
            skipped_locks,
            failed_deliveries,
            events: ledger.into_events(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::Interpretation;
    use crate::error::{CoreError, DeliveryError, SourceError};
    use crate::lock::LockUser;
    use crate::notify::{DeliveryReceipt, DryRunNotifier};
    use crate::source::FixtureSource;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    struct FailingLookup {
        inner: FixtureSource,
        broken_lock: &'static str,
    }

    impl DataSource for FailingLookup {
        fn name(&self) -> &str {
            "failing"
        }

        fn locks(&self) -> std::result::Result<Vec<LockRecord>, SourceError> {
            self.inner.locks()
        }

        fn users_for_lock(
            &self,
            lock_id: &str,
        ) -> std::result::Result<Vec<LockUser>, SourceError> {
            if lock_id == self.broken_lock {
                return Err(SourceError::Unavailable("directory timeout".into()));
            }
            self.inner.users_for_lock(lock_id)
        }

        fn recorded_opens(
            &self,
            tag: &str,
        ) -> std::result::Result<Vec<(String, String)>, SourceError> {
            self.inner.recorded_opens(tag)
        }
    }

    struct OpensUnavailable(FixtureSource);

    impl DataSource for OpensUnavailable {
        fn name(&self) -> &str {
            "opens-unavailable"
        }

        fn locks(&self) -> std::result::Result<Vec<LockRecord>, SourceError> {
            self.0.locks()
        }

        fn users_for_lock(
            &self,
            lock_id: &str,
        ) -> std::result::Result<Vec<LockUser>, SourceError> {
            self.0.users_for_lock(lock_id)
        }

        fn recorded_opens(
            &self,
            _tag: &str,
        ) -> std::result::Result<Vec<(String, String)>, SourceError> {
            Err(SourceError::Busy)
        }
    }

    struct NoLocks;

    impl DataSource for NoLocks {
        fn name(&self) -> &str {
            "down"
        }

        fn locks(&self) -> std::result::Result<Vec<LockRecord>, SourceError> {
            Err(SourceError::Unavailable("registry down".into()))
        }

        fn users_for_lock(
            &self,
            _lock_id: &str,
        ) -> std::result::Result<Vec<LockUser>, SourceError> {
            Ok(Vec::new())
        }
    }

    struct RejectUser(&'static str);

    impl Notifier for RejectUser {
        fn name(&self) -> &str {
            "reject"
        }

        fn send(
            &self,
            user: &LockUser,
            payload: &NotificationPayload,
        ) -> std::result::Result<DeliveryReceipt, DeliveryError> {
            if user.user_id == self.0 {
                return Err(DeliveryError::Rejected {
                    notifier: "reject".into(),
                    message: "token expired".into(),
                });
            }
            DryRunNotifier.send(user, payload)
        }
    }

    #[test]
    fn test_fixture_campaign() {
        let campaign = Campaign::new(FixtureSource::sample(), DryRunNotifier);
        let report = campaign.run(now()).unwrap();

        assert_eq!(report.summary.campaign_tag, "battery_check_2024-03-01");
        assert_eq!(report.stale_locks.len(), 2);
        assert_eq!(report.summary.sent_count, 3);
        assert_eq!(report.summary.opened_count, 2);
        assert_eq!(report.summary.open_rate, 66.67);
        assert_eq!(report.summary.interpretation, Interpretation::Engaged);
        assert_eq!(report.events.len(), 5);
        assert!(report.skipped_locks.is_empty());
        assert!(report.failed_deliveries.is_empty());
    }

    #[test]
    fn test_user_lookup_failure_skips_lock() {
        let source = FailingLookup {
            inner: FixtureSource::sample(),
            broken_lock: "L001",
        };
        let report = Campaign::new(source, DryRunNotifier).run(now()).unwrap();

        assert_eq!(report.skipped_locks.len(), 1);
        assert_eq!(report.skipped_locks[0].lock_id, "L001");
        assert_eq!(report.summary.sent_count, 1);
        // U001's open has no matching send and is ignored.
        assert_eq!(report.summary.opened_count, 1);
    }

    #[test]
    fn test_delivery_failure_skips_user() {
        let campaign = Campaign::new(FixtureSource::sample(), RejectUser("U002"));
        let report = campaign.run(now()).unwrap();

        assert_eq!(report.failed_deliveries.len(), 1);
        assert_eq!(report.failed_deliveries[0].user_id, "U002");
        assert_eq!(report.summary.sent_count, 2);
        assert_eq!(report.summary.opened_count, 2);
        assert_eq!(report.summary.open_rate, 100.0);
    }

    #[test]
    fn test_unreadable_opens_count_as_none() {
        let campaign = Campaign::new(OpensUnavailable(FixtureSource::sample()), DryRunNotifier);
        let report = campaign.run(now()).unwrap();

        assert_eq!(report.summary.sent_count, 3);
        assert_eq!(report.summary.opened_count, 0);
        assert_eq!(report.summary.open_rate, 0.0);
        assert_eq!(report.summary.interpretation, Interpretation::LowEngagement);
        assert_eq!(report.events.len(), 3);
    }

    #[test]
    fn test_payload_uses_filter_threshold() {
        struct Capture(std::cell::RefCell<Vec<String>>);

        impl Notifier for Capture {
            fn name(&self) -> &str {
                "capture"
            }

            fn send(
                &self,
                user: &LockUser,
                payload: &NotificationPayload,
            ) -> std::result::Result<DeliveryReceipt, DeliveryError> {
                self.0.borrow_mut().push(payload.body.clone());
                DryRunNotifier.send(user, payload)
            }
        }

        let campaign = Campaign::new(FixtureSource::sample(), Capture(Default::default()))
            .with_filter(StaleLockFilter::with_threshold_days(7));
        campaign.run(now()).unwrap();

        let bodies = campaign.notifier.0.borrow();
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|body| body.contains("over 7 days")));
    }

    #[test]
    fn test_lock_listing_failure_aborts() {
        let result = Campaign::new(NoLocks, DryRunNotifier).run(now());
        assert!(matches!(result, Err(CoreError::Source(_))));
    }

    #[test]
    fn test_threshold_excludes_recent_locks() {
        // L002 was checked 2024-01-10, 51 days before `now`.
        let campaign = Campaign::new(FixtureSource::sample(), DryRunNotifier)
            .with_filter(StaleLockFilter::with_threshold_days(60));
        let report = campaign.run(now()).unwrap();

        assert_eq!(report.stale_locks.len(), 1);
        assert_eq!(report.stale_locks[0].lock_id, "L001");
        assert_eq!(report.summary.sent_count, 2);
        assert_eq!(report.summary.opened_count, 1);
    }
}
