//! Error types.
//!
//! [`EvolError`] covers configuration mistakes and misuse of the pipeline.
//! [`StopEvolution`] is not an error in the usual sense: it is the signal a
//! failing condition raises, and [`Population::evolve_with`] turns it into a
//! normal early return.
//!
//! [`Population::evolve_with`]: crate::population::Population::evolve_with

use thiserror::Error;

/// Boxed caller error carried through an [`Evolution`](crate::Evolution) step.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the evolution pipeline.
#[derive(Debug, Error)]
pub enum EvolError {
    /// An operator was called with invalid arguments.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Ranking required a fitness that has not been computed yet.
    #[error("individual at position {index} has not been evaluated")]
    Unevaluated { index: usize },

    /// `evaluate` was called but no evaluation function is bound.
    #[error("no evaluation function bound to the population")]
    MissingEvaluator,

    /// Breeding or parent picking was attempted on an empty population.
    #[error("cannot pick parents from an empty population")]
    EmptyPopulation,

    /// The parent picker returned no parents.
    #[error("parent picker returned no parents")]
    NoParents,

    /// The parent picker returned an index outside the parent pool.
    #[error("parent index {index} out of range for {len} individuals")]
    ParentOutOfRange { index: usize, len: usize },

    /// A caller-supplied step failed; the original error is preserved.
    #[error("{0}")]
    Callback(BoxError),
}

impl EvolError {
    /// Wraps a caller error raised inside an evolution step.
    pub fn callback<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        EvolError::Callback(err.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvolError>;

/// Signal raised when an active condition no longer allows evolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("evolution stopped by `{condition}` before generation {generation}")]
pub struct StopEvolution {
    /// Name of the first condition that failed.
    pub condition: String,

    /// Generation the population was at when the check failed.
    pub generation: usize,
}
