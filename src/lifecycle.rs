//! Subscription Lifecycle Generator
//!
//! Builds the renewal chain for every user: an initial subscription from the
//! signup row, then a stochastic number of renewal periods, each derived from
//! the previous period's end date and possibly switching to another paid
//! plan. Subscriptions are immutable once created; a plan change always
//! produces a new record.

use crate::catalog::{PlanCatalog, PlanCatalogEntry};
use crate::error::GenerationError;
use crate::types::{PaymentMethod, PlanId, RecordId, Subscription, SubscriptionStatus, UserSeed};
use chrono::{Duration, Months, NaiveDate};
use rand::Rng;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Probability a renewal keeps the previous period's plan
const PLAN_CONTINUITY: f64 = 0.7;

/// Generator for multi-period subscription chains
pub struct LifecycleGenerator {
    today: NaiveDate,
}

impl LifecycleGenerator {
    /// Create a generator anchored at the given "now" date
    ///
    /// `today` decides whether a period with a past end date is emitted as
    /// expired. Tests inject a fixed date; the pipeline passes the wall
    /// clock.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Generate the full subscription set for a user cohort.
    ///
    /// Output order: all initial subscriptions in input order, then renewal
    /// chains grouped by paid user in first-seen order. The ordering is an
    /// implementation artifact; consumers must rely on the subscription_id
    /// foreign key, not on position.
    #[instrument(skip_all, fields(users = users.len()))]
    pub fn generate<R: Rng + ?Sized>(
        &self,
        users: &[UserSeed],
        catalog: &PlanCatalog,
        rng: &mut R,
    ) -> Result<Vec<Subscription>, GenerationError> {
        if catalog.is_empty() {
            return Err(GenerationError::EmptyCatalog);
        }

        let mut subscriptions = Vec::with_capacity(users.len());
        for user in users {
            let entry = match catalog.get(user.plan_id) {
                Some(entry) => entry,
                None => {
                    warn!(
                        user_id = %user.user_id,
                        plan_id = user.plan_id,
                        "user references unknown plan; skipping"
                    );
                    continue;
                }
            };
            subscriptions.push(self.open_period(
                user.user_id.clone(),
                entry,
                user.signup_date,
                rng,
            ));
        }

        // Paid users in first-seen input order, one initial period each.
        let mut seen = HashSet::new();
        let mut paid_initials = Vec::new();
        for subscription in &subscriptions {
            let is_paid = catalog
                .get(subscription.plan_id)
                .map(|entry| !entry.is_free())
                .unwrap_or(false);
            if is_paid && seen.insert(subscription.user_id.clone()) {
                paid_initials.push(subscription.clone());
            }
        }

        for initial in paid_initials {
            let renewals = sample_renewal_count(rng);
            subscriptions.extend(self.renewal_chain(initial, renewals, catalog, rng));
        }

        info!(
            users = users.len(),
            subscriptions = subscriptions.len(),
            "lifecycle generation complete"
        );
        Ok(subscriptions)
    }

    /// Build `renewals` chained periods off an initial subscription.
    ///
    /// A fold threads the immutable previous period forward; there is no
    /// shared mutable cursor.
    fn renewal_chain<R: Rng + ?Sized>(
        &self,
        initial: Subscription,
        renewals: u32,
        catalog: &PlanCatalog,
        rng: &mut R,
    ) -> Vec<Subscription> {
        let (chain, _) = (0..renewals).fold(
            (Vec::with_capacity(renewals as usize), initial),
            |(mut chain, previous), _| match self.renew(&previous, catalog, rng) {
                Some(next) => {
                    chain.push(next.clone());
                    (chain, next)
                }
                None => (chain, previous),
            },
        );
        chain
    }

    /// Derive one renewal period from the previous one
    fn renew<R: Rng + ?Sized>(
        &self,
        previous: &Subscription,
        catalog: &PlanCatalog,
        rng: &mut R,
    ) -> Option<Subscription> {
        let start_date = match previous.end_date {
            // Open-ended previous period: offset from its start instead
            None => previous.start_date + Duration::days(rng.gen_range(30..40)),
            Some(end_date) => end_date + Duration::days(rng.gen_range(1..8)),
        };

        let plan_id = if rng.gen::<f64>() < PLAN_CONTINUITY {
            previous.plan_id
        } else {
            pick_other_paid_plan(previous.plan_id, catalog, rng)
        };

        let entry = match catalog.get(plan_id) {
            Some(entry) => entry,
            None => {
                warn!(plan_id, "renewal chose unknown plan; keeping previous period");
                return None;
            }
        };

        Some(self.open_period(previous.user_id.clone(), entry, start_date, rng))
    }

    /// Create one subscription period starting at `start_date`
    fn open_period<R: Rng + ?Sized>(
        &self,
        user_id: RecordId,
        entry: &PlanCatalogEntry,
        start_date: NaiveDate,
        rng: &mut R,
    ) -> Subscription {
        if entry.is_free() {
            return Subscription {
                subscription_id: RecordId::generate(rng),
                user_id,
                plan_id: entry.plan_id,
                start_date,
                end_date: None,
                payment_method: PaymentMethod::NotApplicable,
                status: SubscriptionStatus::Active,
            };
        }

        let end_date = add_one_month(start_date);
        let status = if end_date < self.today {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        };

        Subscription {
            subscription_id: RecordId::generate(rng),
            user_id,
            plan_id: entry.plan_id,
            start_date,
            end_date: Some(end_date),
            payment_method: sample_payment_method(rng),
            status,
        }
    }
}

/// Renewal count per paid user, from the mixed bucket distribution:
/// 60% -> 7..12, 25% -> 3..7, 10% -> 12..21, 5% -> 21..31.
fn sample_renewal_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let draw = rng.gen::<f64>();
    if draw < 0.60 {
        rng.gen_range(7..12)
    } else if draw < 0.85 {
        rng.gen_range(3..7)
    } else if draw < 0.95 {
        rng.gen_range(12..21)
    } else {
        rng.gen_range(21..31)
    }
}

/// Payment method from the fixed categorical distribution (60/30/10)
fn sample_payment_method<R: Rng + ?Sized>(rng: &mut R) -> PaymentMethod {
    let draw = rng.gen::<f64>();
    if draw < 0.60 {
        PaymentMethod::CreditCard
    } else if draw < 0.90 {
        PaymentMethod::WalletTransfer
    } else {
        PaymentMethod::BankTransfer
    }
}

/// Uniform choice among paid plans other than `current`.
///
/// Falls back to `current` when the catalog has no alternative paid plan.
fn pick_other_paid_plan<R: Rng + ?Sized>(
    current: PlanId,
    catalog: &PlanCatalog,
    rng: &mut R,
) -> PlanId {
    let mut candidates = catalog.paid_plan_ids();
    candidates.retain(|id| *id != current);
    if candidates.is_empty() {
        return current;
    }
    candidates[rng.gen_range(0..candidates.len())]
}

/// Calendar month advance, falling back to 30 days at the date-range edge
fn add_one_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1))
        .unwrap_or(date + Duration::days(30))
}
