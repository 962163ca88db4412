//! Integration tests for quota-enforced usage generation

use crate::integration::test_utils::{date, reference_date, small_config, subscription};
use chrono::{Duration, NaiveDate};
use saasgen::catalog::PlanCatalog;
use saasgen::pipeline;
use saasgen::random;
use saasgen::types::{RecordId, Subscription, UsageEvent};
use saasgen::usage::{EngagementLevel, UsageGenerator};
use std::collections::HashMap;

fn events_by_subscription(events: &[UsageEvent]) -> HashMap<RecordId, Vec<&UsageEvent>> {
    let mut grouped: HashMap<RecordId, Vec<&UsageEvent>> = HashMap::new();
    for event in events {
        grouped
            .entry(event.subscription_id.clone())
            .or_default()
            .push(event);
    }
    grouped
}

/// No subscription's summed usage ever exceeds its plan's limits.
#[test]
fn test_quota_bound_over_full_run() {
    let catalog = PlanCatalog::standard();
    let config = small_config(60, 21);
    let mut rng = random::seeded(21);

    let run = pipeline::run(&config, &catalog, &mut rng).unwrap();
    let subscriptions: HashMap<_, _> = run
        .subscriptions
        .iter()
        .map(|s| (s.subscription_id.clone(), s))
        .collect();

    for (subscription_id, events) in events_by_subscription(&run.usage_events) {
        let owner: &Subscription = subscriptions
            .get(&subscription_id)
            .copied()
            .expect("every event links to a generated subscription");
        let entry = catalog.get(owner.plan_id).expect("plan exists");

        let api_total: u64 = events.iter().map(|e| e.api_calls).sum();
        let storage_total: f64 = events.iter().map(|e| e.storage_used_mb).sum();

        assert!(
            api_total <= entry.api_limit,
            "{subscription_id}: {api_total} api calls over limit {}",
            entry.api_limit
        );
        assert!(
            storage_total <= entry.storage_limit_mb as f64 + 1e-6,
            "{subscription_id}: {storage_total} MB over limit {}",
            entry.storage_limit_mb
        );
    }
}

/// Every usage date lies within its subscription's window, and each
/// subscription's events are emitted in ascending date order (so a
/// quota-exhausted period has no later-dated stragglers).
#[test]
fn test_window_containment_and_date_order() {
    let catalog = PlanCatalog::standard();
    let config = small_config(60, 22);
    let mut rng = random::seeded(22);

    let run = pipeline::run(&config, &catalog, &mut rng).unwrap();
    let subscriptions: HashMap<_, _> = run
        .subscriptions
        .iter()
        .map(|s| (s.subscription_id.clone(), s))
        .collect();

    for (subscription_id, events) in events_by_subscription(&run.usage_events) {
        let owner = subscriptions.get(&subscription_id).unwrap();
        // Collapsed windows are repaired to one day, so bound by start + 1
        // when the nominal end does not clear it.
        let window_end = owner
            .end_date
            .unwrap_or_else(reference_date)
            .max(owner.start_date + Duration::days(1));

        for event in &events {
            assert!(event.usage_date >= owner.start_date);
            assert!(event.usage_date <= window_end);
        }
        for pair in events.windows(2) {
            assert!(pair[0].usage_date < pair[1].usage_date);
        }
    }
}

/// Concrete scenario: one Professional user (10k API calls, 50k MB),
/// signed up 2024-09-01, a single 30-day period, heavy engagement, forced
/// quota-hit draw.
#[test]
fn test_professional_heavy_quota_hit_scenario() {
    let catalog = PlanCatalog::standard();
    let start = date(2024, 9, 1);
    let end = date(2024, 10, 1);
    let today = date(2024, 10, 15);

    let generator = UsageGenerator::new(today)
        .with_engagement_override(EngagementLevel::Heavy)
        .with_quota_hit_override(true);
    let mut rng = random::seeded(23);

    let subscriptions = vec![subscription("sub00001", "user0001", 3, start, Some(end))];
    let events = generator.generate(&subscriptions, &catalog, &mut rng);

    assert!(!events.is_empty(), "heavy paid period must produce usage");

    let api_total: u64 = events.iter().map(|e| e.api_calls).sum();
    assert!(api_total <= 10_000, "api total {api_total} exceeds the plan limit");

    let last_date: NaiveDate = events.last().unwrap().usage_date;
    assert!(last_date <= end);
}

/// Every emitted event links back to a generated subscription and carries
/// that subscription's owning user.
#[test]
fn test_usage_respects_subscription_foreign_keys() {
    let catalog = PlanCatalog::standard();
    let config = small_config(40, 24);
    let mut rng = random::seeded(24);

    let run = pipeline::run(&config, &catalog, &mut rng).unwrap();
    let known: HashMap<_, _> = run
        .subscriptions
        .iter()
        .map(|s| (s.subscription_id.clone(), s.user_id.clone()))
        .collect();

    for event in &run.usage_events {
        let owner_user = known
            .get(&event.subscription_id)
            .expect("event references a generated subscription");
        assert_eq!(*owner_user, event.user_id);
    }
}

/// Open-ended free periods simulate up to "now" and never beyond.
#[test]
fn test_open_ended_window_caps_at_reference_date() {
    let catalog = PlanCatalog::standard();
    let today = reference_date();
    let generator =
        UsageGenerator::new(today).with_engagement_override(EngagementLevel::Moderate);
    let mut rng = random::seeded(25);

    let subscriptions = vec![subscription(
        "sub00001",
        "user0001",
        1,
        date(2025, 3, 1),
        None,
    )];
    let events = generator.generate(&subscriptions, &catalog, &mut rng);

    for event in &events {
        assert!(event.usage_date <= today);
    }
}
