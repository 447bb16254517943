//! Property tests for the stale lock filter.

use battery_campaign_core::campaign::parse_check_timestamp;
use battery_campaign_core::{LockRecord, StaleLockFilter};
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

const DAY_SECS: i64 = 24 * 60 * 60;

fn build_locks(now: DateTime<Utc>, ages_secs: &[i64]) -> Vec<LockRecord> {
    ages_secs
        .iter()
        .enumerate()
        .map(|(i, age)| {
            LockRecord::new(format!("L{i:03}"), (now - Duration::seconds(*age)).to_rfc3339())
        })
        .collect()
}

fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    // 2001-09-09 .. 2033-05-18
    (1_000_000_000i64..2_000_000_000i64).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
}

proptest! {
    #[test]
    fn never_returns_recently_checked_locks(
        now in arb_now(),
        threshold_days in 0u32..400,
        ages in prop::collection::vec(-400 * DAY_SECS..800 * DAY_SECS, 0..40),
    ) {
        let filter = StaleLockFilter::with_threshold_days(threshold_days);
        let locks = build_locks(now, &ages);
        let cutoff = now - Duration::days(threshold_days as i64);

        let report = filter.filter_stale(&locks, now);

        prop_assert!(report.malformed.is_empty());
        for lock in &report.stale {
            let checked = parse_check_timestamp(&lock.last_battery_check).unwrap();
            prop_assert!(checked < cutoff);
        }

        let expected = ages
            .iter()
            .filter(|age| **age > threshold_days as i64 * DAY_SECS)
            .count();
        prop_assert_eq!(report.stale.len(), expected);
    }

    #[test]
    fn filtering_is_idempotent(
        now in arb_now(),
        threshold_days in 0u32..400,
        ages in prop::collection::vec(-400 * DAY_SECS..800 * DAY_SECS, 0..40),
    ) {
        let filter = StaleLockFilter::with_threshold_days(threshold_days);
        let locks = build_locks(now, &ages);

        let first = filter.filter_stale(&locks, now);
        let second = filter.filter_stale(&locks, now);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exact_cutoff_is_never_stale(now in arb_now(), threshold_days in 0u32..400) {
        let filter = StaleLockFilter::with_threshold_days(threshold_days);
        let locks = build_locks(now, &[threshold_days as i64 * DAY_SECS]);

        prop_assert!(filter.filter_stale(&locks, now).stale.is_empty());
    }

    #[test]
    fn garbage_timestamps_are_reported(raw in "[a-z ]{0,12}") {
        let locks = vec![LockRecord::new("L001", raw.clone())];
        let report = StaleLockFilter::new().filter_stale(&locks, Utc::now());

        prop_assert!(report.stale.is_empty());
        prop_assert_eq!(report.malformed.len(), 1);
        prop_assert_eq!(&report.malformed[0].raw_timestamp, &raw);
    }
}
