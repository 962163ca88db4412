//! Injected randomness
//!
//! Both generators take `&mut impl Rng` rather than reaching for a global
//! source, so tests can pass a seeded instance and assert exact output
//! sequences. These helpers build the concrete source for a run.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic source for reproducible runs
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// OS-entropy source for unseeded runs
pub fn from_entropy() -> StdRng {
    StdRng::from_entropy()
}

/// Source for a run: seeded when a seed is configured, entropy otherwise
pub fn for_run(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => seeded(seed),
        None => from_entropy(),
    }
}
