//! Integration tests for the synthetic SaaS dataset generator

mod lifecycle_chaining;
mod pipeline_run;
mod usage_quota;
