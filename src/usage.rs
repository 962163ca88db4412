//! Quota-Enforcing Usage Generator
//!
//! Simulates dated usage events for each subscription period. Volumes grow
//! over the period, dip on weekends, and are capped by the owning plan's API
//! and storage ceilings; a period stops producing events the moment either
//! ceiling is reached. Cumulative counters track exactly the emitted values,
//! so the quota bound holds by construction.

use crate::catalog::{PlanCatalog, UsageEnvelope};
use crate::types::{RecordId, Subscription, UsageEvent};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use rand_distr::{Beta, Distribution};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Default cap on sampled occasions per subscription period
const MAX_OCCASIONS: usize = 60;

/// Default probability that a free-plan sampled day produces no event
const FREE_PLAN_SKIP_PROBABILITY: f64 = 0.3;

/// Weekend usage discount (Sat/Sun)
const WEEKEND_FACTOR: f64 = 0.6;

/// Per-user engagement trait, assigned once and shared by every period the
/// user owns. Sets the sampling cadence and the quota-hit likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementLevel {
    /// Daily cadence, most likely to exhaust low-tier quotas
    Heavy,
    /// Every 2-3 days
    Moderate,
    /// Every 4-7 days
    Light,
}

impl EngagementLevel {
    /// Draw a level: 15% heavy, 40% moderate, 45% light
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let draw = rng.gen::<f64>();
        if draw < 0.15 {
            EngagementLevel::Heavy
        } else if draw < 0.55 {
            EngagementLevel::Moderate
        } else {
            EngagementLevel::Light
        }
    }

    /// Base number of days between sampled occasions
    pub fn cadence_days(&self) -> i64 {
        match self {
            EngagementLevel::Heavy => 1,
            EngagementLevel::Moderate => 2,
            EngagementLevel::Light => 4,
        }
    }

    /// Probability that a period on this engagement level hits its quota.
    ///
    /// Engagement and plan tier jointly determine the likelihood; heavy
    /// users on low-tier plans are pushed hardest.
    pub fn quota_hit_probability(&self, low_tier: bool) -> f64 {
        match (self, low_tier) {
            (EngagementLevel::Heavy, true) => 0.40,
            (EngagementLevel::Heavy, false) => 0.15,
            (EngagementLevel::Moderate, true) => 0.15,
            (EngagementLevel::Moderate, false) => 0.05,
            (EngagementLevel::Light, true) => 0.05,
            (EngagementLevel::Light, false) => 0.01,
        }
    }
}

/// One drawn usage occasion, before the quota commit point
struct Occasion {
    storage_mb: f64,
    api_calls: u64,
    actions: u32,
    active_minutes: u32,
}

/// Generator for quota-enforced usage events
pub struct UsageGenerator {
    today: NaiveDate,
    max_occasions: usize,
    free_plan_skip_probability: f64,
    engagement_override: Option<EngagementLevel>,
    quota_hit_override: Option<bool>,
    beta: Beta<f64>,
}

impl UsageGenerator {
    /// Create a generator anchored at the given "now" date
    ///
    /// Open-ended periods are simulated up to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            max_occasions: MAX_OCCASIONS,
            free_plan_skip_probability: FREE_PLAN_SKIP_PROBABILITY,
            engagement_override: None,
            quota_hit_override: None,
            beta: Beta::new(2.0, 5.0).expect("Beta(2,5) shape parameters are valid"),
        }
    }

    /// Override the per-subscription occasion cap
    pub fn with_max_occasions(mut self, max_occasions: usize) -> Self {
        self.max_occasions = max_occasions;
        self
    }

    /// Override the free-plan sampled-day skip probability
    pub fn with_free_plan_skip_probability(mut self, probability: f64) -> Self {
        self.free_plan_skip_probability = probability;
        self
    }

    /// Force every user onto one engagement level instead of drawing it.
    /// Intended for scenario tests.
    pub fn with_engagement_override(mut self, level: EngagementLevel) -> Self {
        self.engagement_override = Some(level);
        self
    }

    /// Force the per-period quota-hit draw instead of sampling the
    /// Bernoulli. Intended for scenario tests.
    pub fn with_quota_hit_override(mut self, will_hit_quota: bool) -> Self {
        self.quota_hit_override = Some(will_hit_quota);
        self
    }

    /// Generate usage events for every subscription.
    ///
    /// Subscriptions referencing a plan the catalog does not know are
    /// skipped with a warning. Events for one subscription are emitted in
    /// ascending date order.
    #[instrument(skip_all, fields(subscriptions = subscriptions.len()))]
    pub fn generate<R: Rng + ?Sized>(
        &self,
        subscriptions: &[Subscription],
        catalog: &PlanCatalog,
        rng: &mut R,
    ) -> Vec<UsageEvent> {
        let mut engagement: HashMap<RecordId, EngagementLevel> = HashMap::new();
        let mut events = Vec::new();

        for subscription in subscriptions {
            let entry = match catalog.get(subscription.plan_id) {
                Some(entry) => entry,
                None => {
                    warn!(
                        subscription_id = %subscription.subscription_id,
                        plan_id = subscription.plan_id,
                        "subscription references unknown plan; skipping"
                    );
                    continue;
                }
            };

            let level = *engagement
                .entry(subscription.user_id.clone())
                .or_insert_with(|| match self.engagement_override {
                    Some(level) => level,
                    None => EngagementLevel::sample(rng),
                });

            events.extend(self.simulate_period(subscription, entry, level, rng));
        }

        info!(events = events.len(), "usage generation complete");
        events
    }

    /// Walk one subscription period day by day, emitting events until the
    /// window ends, the occasion cap is reached, or a quota is exhausted.
    fn simulate_period<R: Rng + ?Sized>(
        &self,
        subscription: &Subscription,
        entry: &crate::catalog::PlanCatalogEntry,
        level: EngagementLevel,
        rng: &mut R,
    ) -> Vec<UsageEvent> {
        let start = subscription.start_date;
        let mut end = subscription.end_date.unwrap_or(self.today);
        if start >= end {
            // Degenerate window: repair locally instead of failing.
            end = start + Duration::days(1);
        }
        let total_days = (end - start).num_days().max(1);

        let will_hit_quota = match self.quota_hit_override {
            Some(forced) => forced,
            None => rng.gen::<f64>() < level.quota_hit_probability(entry.tier.is_low_tier()),
        };

        let envelope = entry.tier.envelope();
        let storage_limit = entry.storage_limit_mb as f64;
        let mut cumulative_api: u64 = 0;
        let mut cumulative_storage: f64 = 0.0;
        let mut cursor = start;
        let mut events = Vec::new();

        while events.len() < self.max_occasions {
            let step = (level.cadence_days() + rng.gen_range(-1..3)).max(1);
            cursor = cursor + Duration::days(step);
            if cursor > end {
                break;
            }

            if entry.is_free() && rng.gen::<f64>() < self.free_plan_skip_probability {
                continue;
            }

            let weekend_factor = match cursor.weekday() {
                Weekday::Sat | Weekday::Sun => WEEKEND_FACTOR,
                _ => 1.0,
            };
            let elapsed = (cursor - start).num_days() as f64;
            let growth_factor = 1.0 + (elapsed / total_days as f64) * 0.3;
            let burst_factor = if will_hit_quota {
                rng.gen_range(1.5..2.5)
            } else {
                rng.gen_range(0.5..1.2)
            };
            let scale = weekend_factor * growth_factor * burst_factor;

            let occasion = self.draw_occasion(&envelope, scale, rng);

            // Quota commit point: clamp each metric independently to its
            // remaining headroom and stop the period once either runs out.
            let mut api_calls = occasion.api_calls;
            let mut storage_mb = occasion.storage_mb;
            let mut exhausted = false;

            if cumulative_api + api_calls > entry.api_limit {
                api_calls = entry.api_limit - cumulative_api;
                exhausted = true;
            }
            if cumulative_storage + storage_mb > storage_limit {
                storage_mb = (storage_limit - cumulative_storage).max(0.0);
                exhausted = true;
            }

            cumulative_api += api_calls;
            cumulative_storage += storage_mb;

            if api_calls > 0 || storage_mb > 0.0 {
                events.push(UsageEvent {
                    usage_id: RecordId::generate(rng),
                    user_id: subscription.user_id.clone(),
                    subscription_id: subscription.subscription_id.clone(),
                    usage_date: cursor,
                    actions_performed: occasion.actions,
                    storage_used_mb: storage_mb,
                    api_calls,
                    active_minutes: occasion.active_minutes,
                });
            }

            if exhausted {
                debug!(
                    subscription_id = %subscription.subscription_id,
                    api_used = cumulative_api,
                    "quota exhausted; ending period early"
                );
                break;
            }
        }

        events
    }

    /// Draw one occasion's volumes from the tier envelope.
    ///
    /// Each metric is a Beta(2,5) draw mapped into the tier band and scaled;
    /// `actions_performed` gets an independent 0.8-1.2x jitter so it tracks
    /// `api_calls` loosely rather than deterministically. Floors (1 for
    /// counts, 0.1 MB for storage) are applied here, before the quota
    /// commit point.
    fn draw_occasion<R: Rng + ?Sized>(
        &self,
        envelope: &UsageEnvelope,
        scale: f64,
        rng: &mut R,
    ) -> Occasion {
        let storage_raw = envelope.storage_mb.map(self.beta.sample(rng)) * scale;
        let api_raw = envelope.api_calls.map(self.beta.sample(rng)) * scale;
        let actions_raw = envelope.actions.map(self.beta.sample(rng)) * scale;
        let minutes_raw = envelope.active_minutes.map(self.beta.sample(rng)) * scale;
        let correlation = rng.gen_range(0.8..1.2);

        Occasion {
            storage_mb: round2(storage_raw).max(0.1),
            api_calls: (api_raw as u64).max(1),
            actions: ((actions_raw * correlation) as u32).max(1),
            active_minutes: (minutes_raw as u32).max(1),
        }
    }
}

/// Round to two decimal places (storage is reported in hundredths of a MB)
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
