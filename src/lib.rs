//! Saasgen: Synthetic SaaS Subscription Dataset Generation
//!
//! Simulates a SaaS customer base end to end: a seeded user cohort, a static
//! plan catalog, multi-period subscription renewal chains, and per-period
//! usage events capped by each plan's API and storage quotas. Output is a
//! set of ordered, immutable record sets handed to downstream loaders.

pub mod catalog;
pub mod cli;
pub mod cohort;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod pipeline;
pub mod random;
pub mod types;
pub mod usage;
