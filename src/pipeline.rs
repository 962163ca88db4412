//! Generation pipeline
//!
//! Runs the generators in dependency order — cohort seeding, subscription
//! lifecycle, quota-enforced usage — and hands the ordered record sets to
//! the caller. JSON export is the boundary to the downstream loaders; the
//! pipeline assumes nothing about their write semantics.

use crate::catalog::PlanCatalog;
use crate::cohort;
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::lifecycle::LifecycleGenerator;
use crate::types::{PlanId, Subscription, SubscriptionStatus, UsageEvent, UserSeed};
use crate::usage::UsageGenerator;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, instrument};

/// Output of one generation run: the ordered record sets consumed whole by
/// the downstream loaders.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRun {
    pub users: Vec<UserSeed>,
    pub subscriptions: Vec<Subscription>,
    pub usage_events: Vec<UsageEvent>,
}

/// Per-plan record counts for the run report
#[derive(Debug, Clone, Serialize)]
pub struct PlanActivity {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub subscriptions: usize,
    pub usage_events: usize,
}

/// Aggregate figures for the run report
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub users: usize,
    pub subscriptions: usize,
    pub usage_events: usize,
    pub expired_subscriptions: usize,
    pub open_ended_subscriptions: usize,
    pub per_plan: Vec<PlanActivity>,
}

impl GenerationRun {
    /// Aggregate counts for reporting
    pub fn summary(&self, catalog: &PlanCatalog) -> RunSummary {
        let mut subscriptions_by_plan: HashMap<PlanId, usize> = HashMap::new();
        for subscription in &self.subscriptions {
            *subscriptions_by_plan.entry(subscription.plan_id).or_default() += 1;
        }

        let plan_by_subscription: HashMap<_, _> = self
            .subscriptions
            .iter()
            .map(|s| (s.subscription_id.clone(), s.plan_id))
            .collect();
        let mut events_by_plan: HashMap<PlanId, usize> = HashMap::new();
        for event in &self.usage_events {
            if let Some(plan_id) = plan_by_subscription.get(&event.subscription_id) {
                *events_by_plan.entry(*plan_id).or_default() += 1;
            }
        }

        let per_plan = catalog
            .iter()
            .map(|entry| PlanActivity {
                plan_id: entry.plan_id,
                plan_name: entry.plan_name.clone(),
                subscriptions: subscriptions_by_plan
                    .get(&entry.plan_id)
                    .copied()
                    .unwrap_or(0),
                usage_events: events_by_plan.get(&entry.plan_id).copied().unwrap_or(0),
            })
            .collect();

        RunSummary {
            users: self.users.len(),
            subscriptions: self.subscriptions.len(),
            usage_events: self.usage_events.len(),
            expired_subscriptions: self
                .subscriptions
                .iter()
                .filter(|s| s.status == SubscriptionStatus::Expired)
                .count(),
            open_ended_subscriptions: self
                .subscriptions
                .iter()
                .filter(|s| s.is_open_ended())
                .count(),
            per_plan,
        }
    }

    /// Write the record sets (plus the catalog) as pretty JSON files
    pub fn write_json(&self, dir: &Path, catalog: &PlanCatalog) -> Result<(), GenerationError> {
        fs::create_dir_all(dir)?;
        write_pretty(&dir.join("plans.json"), &catalog.iter().collect::<Vec<_>>())?;
        write_pretty(&dir.join("users.json"), &self.users)?;
        write_pretty(&dir.join("subscriptions.json"), &self.subscriptions)?;
        write_pretty(&dir.join("usage_events.json"), &self.usage_events)?;
        info!(directory = %dir.display(), "run exported");
        Ok(())
    }
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), GenerationError> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Run the full pipeline with the supplied random source.
///
/// The catalog is built once by the caller and passed by reference into
/// every stage; it is never rebuilt mid-generation.
#[instrument(skip_all)]
pub fn run<R: Rng + ?Sized>(
    config: &GenerationConfig,
    catalog: &PlanCatalog,
    rng: &mut R,
) -> Result<GenerationRun, GenerationError> {
    config.validate()?;
    let today = config
        .reference_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let users = cohort::generate_cohort(
        config.user_count,
        config.signup_window_start,
        today,
        catalog,
        &config.plan_mix,
        rng,
    )?;

    let subscriptions = LifecycleGenerator::new(today).generate(&users, catalog, rng)?;

    let usage_events = UsageGenerator::new(today)
        .with_max_occasions(config.max_occasions_per_subscription)
        .with_free_plan_skip_probability(config.free_plan_skip_probability)
        .generate(&subscriptions, catalog, rng);

    info!(
        users = users.len(),
        subscriptions = subscriptions.len(),
        usage_events = usage_events.len(),
        "generation run complete"
    );

    Ok(GenerationRun {
        users,
        subscriptions,
        usage_events,
    })
}
