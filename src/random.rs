//! Random number generation.
//!
//! Each [`Population`](crate::Population) owns one generator so that a
//! seeded run is reproducible end to end.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generator type handed to every caller-supplied callable.
pub type EvolRng = StdRng;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> EvolRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from `seed`, or from fresh entropy when `None`.
pub fn rng_from_option(seed: Option<u64>) -> EvolRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}
