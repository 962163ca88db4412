//! Cohort seeding
//!
//! Synthesizes the user tuples the lifecycle generator consumes: an opaque
//! user id, an assigned plan, and a signup date uniform over the configured
//! window. Real deployments can skip this module and feed their own rows.

use crate::catalog::PlanCatalog;
use crate::error::GenerationError;
use crate::types::{RecordId, UserSeed};
use chrono::{Duration, NaiveDate};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{info, instrument};

/// Seed `count` users with weighted plan assignment.
///
/// `plan_mix` carries one weight per catalog plan in ascending id order
/// (default 0.33/0.27/0.18/0.16/0.06 across the five standard tiers).
#[instrument(skip_all, fields(count))]
pub fn generate_cohort<R: Rng + ?Sized>(
    count: usize,
    signup_window_start: NaiveDate,
    today: NaiveDate,
    catalog: &PlanCatalog,
    plan_mix: &[f64],
    rng: &mut R,
) -> Result<Vec<UserSeed>, GenerationError> {
    if catalog.is_empty() {
        return Err(GenerationError::EmptyCatalog);
    }

    let plan_ids = catalog.plan_ids();
    if plan_mix.len() != plan_ids.len() {
        return Err(GenerationError::InvalidPlanMix(format!(
            "{} weights for {} catalog plans",
            plan_mix.len(),
            plan_ids.len()
        )));
    }
    let plan_weights =
        WeightedIndex::new(plan_mix).map_err(|e| GenerationError::InvalidPlanMix(e.to_string()))?;

    let window_days = (today - signup_window_start).num_days().max(0);

    let mut users = Vec::with_capacity(count);
    for _ in 0..count {
        let signup_date = signup_window_start + Duration::days(rng.gen_range(0..=window_days));
        let plan_id = plan_ids[plan_weights.sample(rng)];
        users.push(UserSeed {
            user_id: RecordId::generate(rng),
            plan_id,
            signup_date,
        });
    }

    info!(users = users.len(), "cohort seeded");
    Ok(users)
}
