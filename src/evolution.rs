//! Reusable evolution recipes.
//!
//! An [`Evolution`] is an ordered list of pipeline steps built once and
//! applied to a [`Population`] once per generation by
//! [`Population::evolve`] / [`Population::evolve_with`].
//!
//! ```
//! use u_evol::{Evolution, Population, PopulationConfig, Selection, Survive};
//!
//! let mut evo = Evolution::new()
//!     .with_name("halve-and-refill")
//!     .survive(Survive::fraction(0.5))
//!     .breed(Selection::Tournament(3).picker(2, false), |parents: &[&i64], _rng| {
//!         (parents[0] + parents[1]) / 2
//!     })
//!     .mutate(|x: &i64, _rng| x + 1, 0.1)
//!     .evaluate();
//!
//! let mut pop = Population::new(0..50i64, PopulationConfig::default().with_seed(1))
//!     .unwrap()
//!     .with_evaluator(|x: &i64| (x * x) as f64);
//! pop.evaluate().unwrap();
//! pop.evolve(&mut evo, 5).unwrap();
//! assert_eq!(pop.generation(), 5);
//! ```

use crate::error::{BoxError, EvolError, Result};
use crate::population::{Individual, Population, Survive};
use crate::random::EvolRng;

type StepFn<'a, C> = Box<dyn FnMut(&mut Population<C>) -> Result<()> + 'a>;

struct Step<'a, C> {
    name: &'static str,
    run: StepFn<'a, C>,
}

/// An ordered sequence of pipeline steps.
///
/// Steps may borrow from the caller for `'a`, so closures can capture
/// references to problem data.
pub struct Evolution<'a, C> {
    name: Option<String>,
    steps: Vec<Step<'a, C>>,
}

impl<'a, C: Clone + 'a> Default for Evolution<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: Clone + 'a> Evolution<'a, C> {
    /// Creates an empty evolution.
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    /// Names the evolution; the name shows up in log output.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    fn push<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: FnMut(&mut Population<C>) -> Result<()> + 'a,
    {
        self.steps.push(Step {
            name,
            run: Box::new(run),
        });
        self
    }

    /// Evaluates with the population's bound function.
    pub fn evaluate(self) -> Self {
        self.push("evaluate", |pop| pop.evaluate().map(|_| ()))
    }

    /// Evaluates with `eval`, overriding the population's function.
    pub fn evaluate_with<F>(self, mut eval: F) -> Self
    where
        F: FnMut(&C) -> f64 + 'a,
    {
        self.push("evaluate", move |pop| {
            pop.evaluate_with(&mut eval);
            Ok(())
        })
    }

    /// See [`Population::mutate`].
    pub fn mutate<F>(self, mut mutate: F, probability: f64) -> Self
    where
        F: FnMut(&C, &mut EvolRng) -> C + 'a,
    {
        self.push("mutate", move |pop| {
            pop.mutate(&mut mutate, probability).map(|_| ())
        })
    }

    /// See [`Population::survive`].
    pub fn survive(self, survive: Survive) -> Self {
        self.push("survive", move |pop| pop.survive(survive).map(|_| ()))
    }

    /// See [`Population::breed`].
    pub fn breed<P, F>(self, mut picker: P, mut combiner: F) -> Self
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize> + 'a,
        F: FnMut(&[&C], &mut EvolRng) -> C + 'a,
    {
        self.push("breed", move |pop| {
            pop.breed(&mut picker, &mut combiner).map(|_| ())
        })
    }

    /// See [`Population::breed_to`].
    pub fn breed_to<P, F>(self, size: usize, mut picker: P, mut combiner: F) -> Self
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize> + 'a,
        F: FnMut(&[&C], &mut EvolRng) -> C + 'a,
    {
        self.push("breed", move |pop| {
            pop.breed_to(size, &mut picker, &mut combiner).map(|_| ())
        })
    }

    /// See [`Population::filter`].
    pub fn filter<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&Individual<C>) -> bool + 'a,
    {
        self.push("filter", move |pop| {
            pop.filter(&mut keep);
            Ok(())
        })
    }

    /// See [`Population::map`].
    pub fn map<F>(self, mut f: F) -> Self
    where
        F: FnMut(&C) -> C + 'a,
    {
        self.push("map", move |pop| {
            pop.map(&mut f);
            Ok(())
        })
    }

    /// Runs a side-effecting function on the population.
    pub fn callback<F>(self, mut f: F) -> Self
    where
        F: FnMut(&Population<C>) + 'a,
    {
        self.push("callback", move |pop| {
            f(pop);
            Ok(())
        })
    }

    /// Runs a fallible side-effecting function on the population.
    ///
    /// Its error surfaces from `evolve` as [`EvolError::Callback`].
    pub fn try_callback<F, E>(self, mut f: F) -> Self
    where
        F: FnMut(&Population<C>) -> std::result::Result<(), E> + 'a,
        E: Into<BoxError>,
    {
        self.push("callback", move |pop| f(pop).map_err(EvolError::callback))
    }

    /// Applies `inner` `n` times as a single step.
    ///
    /// The repetitions belong to one generation of the outer evolution and
    /// are not interrupted by conditions.
    pub fn repeat(self, mut inner: Evolution<'a, C>, n: usize) -> Self {
        self.push("repeat", move |pop| {
            for _ in 0..n {
                inner.apply(pop)?;
            }
            Ok(())
        })
    }

    /// Runs every step once, in order, against `population`.
    ///
    /// Does not touch the generation counter.
    pub fn apply(&mut self, population: &mut Population<C>) -> Result<()> {
        for step in self.steps.iter_mut() {
            (step.run)(population)?;
        }
        Ok(())
    }
}

impl<C> std::fmt::Debug for Evolution<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evolution")
            .field("name", &self.name)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
