//! Plan Catalog
//!
//! Static reference table of subscription tiers and their resource ceilings.
//! The catalog is built once per run and passed by reference into both
//! generators; it is never rebuilt or mutated mid-generation.

use crate::types::PlanId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subscription tier ladder
///
/// The tier selects the per-occasion usage envelope and the "low tier" flag
/// that feeds quota-hit probabilities. Free and Starter are the low tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanTier {
    Free,
    Starter,
    Professional,
    Business,
    Enterprise,
}

impl PlanTier {
    pub fn is_free(&self) -> bool {
        matches!(self, PlanTier::Free)
    }

    /// Low-tier plans push heavy users toward quota exhaustion
    pub fn is_low_tier(&self) -> bool {
        matches!(self, PlanTier::Free | PlanTier::Starter)
    }

    /// Per-occasion volume envelope for this tier
    ///
    /// Each range is the [low, low+span] band a Beta(2,5) draw is mapped
    /// into before scaling; bands widen roughly 5-10x per tier step.
    pub fn envelope(&self) -> UsageEnvelope {
        match self {
            PlanTier::Free => UsageEnvelope {
                storage_mb: MetricRange::new(5.0, 45.0),
                api_calls: MetricRange::new(1.0, 9.0),
                actions: MetricRange::new(3.0, 17.0),
                active_minutes: MetricRange::new(5.0, 55.0),
            },
            PlanTier::Starter => UsageEnvelope {
                storage_mb: MetricRange::new(50.0, 450.0),
                api_calls: MetricRange::new(10.0, 90.0),
                actions: MetricRange::new(10.0, 90.0),
                active_minutes: MetricRange::new(15.0, 135.0),
            },
            PlanTier::Professional => UsageEnvelope {
                storage_mb: MetricRange::new(500.0, 4500.0),
                api_calls: MetricRange::new(100.0, 900.0),
                actions: MetricRange::new(50.0, 450.0),
                active_minutes: MetricRange::new(30.0, 270.0),
            },
            PlanTier::Business => UsageEnvelope {
                storage_mb: MetricRange::new(2000.0, 18000.0),
                api_calls: MetricRange::new(500.0, 4500.0),
                actions: MetricRange::new(100.0, 900.0),
                active_minutes: MetricRange::new(60.0, 540.0),
            },
            PlanTier::Enterprise => UsageEnvelope {
                storage_mb: MetricRange::new(10000.0, 90000.0),
                api_calls: MetricRange::new(2500.0, 22500.0),
                actions: MetricRange::new(500.0, 4500.0),
                active_minutes: MetricRange::new(120.0, 1080.0),
            },
        }
    }
}

/// Inclusive lower bound plus span of a sampled volume band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub low: f64,
    pub span: f64,
}

impl MetricRange {
    pub fn new(low: f64, span: f64) -> Self {
        MetricRange { low, span }
    }

    /// Map a unit-interval draw into this band
    pub fn map(&self, unit: f64) -> f64 {
        self.low + unit * self.span
    }
}

/// Per-occasion volume bands for the four usage metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageEnvelope {
    pub storage_mb: MetricRange,
    pub api_calls: MetricRange,
    pub actions: MetricRange,
    pub active_minutes: MetricRange,
}

/// Immutable reference row describing one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCatalogEntry {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub tier: PlanTier,
    pub monthly_fee: f64,
    pub api_limit: u64,
    pub storage_limit_mb: u64,
}

impl PlanCatalogEntry {
    pub fn is_free(&self) -> bool {
        self.tier.is_free()
    }
}

/// Read-only lookup structure mapping plan ids to their limits.
///
/// Backed by a `BTreeMap` so iteration order (and everything derived from
/// it, such as renewal plan choices) is deterministic under a seeded RNG.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanCatalog {
    entries: BTreeMap<PlanId, PlanCatalogEntry>,
}

impl PlanCatalog {
    pub fn new() -> Self {
        PlanCatalog {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in five-tier catalog used by default runs
    pub fn standard() -> Self {
        let mut catalog = PlanCatalog::new();
        catalog.insert(PlanCatalogEntry {
            plan_id: 1,
            plan_name: "Free".to_string(),
            tier: PlanTier::Free,
            monthly_fee: 0.0,
            api_limit: 100,
            storage_limit_mb: 500,
        });
        catalog.insert(PlanCatalogEntry {
            plan_id: 2,
            plan_name: "Starter".to_string(),
            tier: PlanTier::Starter,
            monthly_fee: 15.0,
            api_limit: 1_000,
            storage_limit_mb: 5_000,
        });
        catalog.insert(PlanCatalogEntry {
            plan_id: 3,
            plan_name: "Professional".to_string(),
            tier: PlanTier::Professional,
            monthly_fee: 49.0,
            api_limit: 10_000,
            storage_limit_mb: 50_000,
        });
        catalog.insert(PlanCatalogEntry {
            plan_id: 4,
            plan_name: "Business".to_string(),
            tier: PlanTier::Business,
            monthly_fee: 99.0,
            api_limit: 50_000,
            storage_limit_mb: 200_000,
        });
        catalog.insert(PlanCatalogEntry {
            plan_id: 5,
            plan_name: "Enterprise".to_string(),
            tier: PlanTier::Enterprise,
            monthly_fee: 299.0,
            api_limit: 250_000,
            storage_limit_mb: 1_000_000,
        });
        catalog
    }

    pub fn insert(&mut self, entry: PlanCatalogEntry) {
        self.entries.insert(entry.plan_id, entry);
    }

    pub fn get(&self, plan_id: PlanId) -> Option<&PlanCatalogEntry> {
        self.entries.get(&plan_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All plan ids in ascending order
    pub fn plan_ids(&self) -> Vec<PlanId> {
        self.entries.keys().copied().collect()
    }

    /// Ids of every non-free plan, in ascending order
    pub fn paid_plan_ids(&self) -> Vec<PlanId> {
        self.entries
            .values()
            .filter(|entry| !entry.is_free())
            .map(|entry| entry.plan_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanCatalogEntry> {
        self.entries.values()
    }
}
