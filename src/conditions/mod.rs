//! Declarative stop conditions.
//!
//! A [`Condition`] is a predicate over a [`Population`](crate::Population)
//! that answers "may evolution continue?". Conditions are activated on a
//! [`ConditionStack`] for the lifetime of a guard and consulted by
//! [`Population::evolve_with`](crate::Population::evolve_with) before every
//! generation. Nested conditions compose conjunctively: the loop stops as
//! soon as any active condition fails.
//!
//! # Built-in Conditions
//!
//! - [`TimeLimit`]: wall-clock budget on a monotonic clock
//! - [`MinimumProgress`]: stop when the best fitness stalls
//! - [`GenerationLimit`]: absolute generation budget
//! - [`Predicate`]: any closure over the population
//!
//! # Example
//!
//! ```
//! use u_evol::{ConditionStack, Evolution, MinimumProgress, Population, PopulationConfig, Selection, Survive};
//!
//! let mut evo = Evolution::new()
//!     .survive(Survive::fraction(0.5))
//!     .breed(Selection::Random.picker(2, false), |p: &[&i64], _| (p[0] + p[1]) / 2)
//!     .evaluate();
//! let mut pop = Population::new(0..100i64, PopulationConfig::default().with_seed(7))
//!     .unwrap()
//!     .with_evaluator(|x: &i64| (x * x) as f64);
//!
//! let conditions = ConditionStack::new();
//! {
//!     let _stall = conditions.enter(MinimumProgress::new(10));
//!     pop.evolve_with(&conditions, &mut evo, 100).unwrap();
//! }
//! assert_eq!(pop.generation(), 10);
//! ```

mod generation_limit;
mod minimum_progress;
mod stack;
mod time_limit;
mod types;

pub use generation_limit::GenerationLimit;
pub use minimum_progress::MinimumProgress;
pub use stack::{ConditionGuard, ConditionStack};
pub use time_limit::TimeLimit;
pub use types::{Condition, Predicate};
