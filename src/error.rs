//! Error types for the synthetic dataset generators.

use thiserror::Error;

/// Errors raised while producing or exporting a generation run.
///
/// Unknown plan references are deliberately *not* represented here: the
/// generators skip the affected record with a warning and continue, so bad
/// catalog data surfaces as smaller output rather than a failed batch.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("plan catalog is empty; no subscriptions can be generated")]
    EmptyCatalog,

    #[error("invalid plan mix: {0}")]
    InvalidPlanMix(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
