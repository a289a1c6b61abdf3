//! The condition contract.

use crate::population::Population;

/// A predicate consulted before every generation.
///
/// [`check`](Condition::check) answers "may evolution continue?". Returning
/// `false` stops the enclosing [`evolve_with`](Population::evolve_with) loop
/// before the next generation is applied.
///
/// Stateful conditions reset their state in
/// [`on_enter`](Condition::on_enter), which the
/// [`ConditionStack`](super::ConditionStack) calls when the condition becomes
/// active.
pub trait Condition<C> {
    /// Short name used in [`StopEvolution`](crate::StopEvolution) and logs.
    fn name(&self) -> &str {
        "predicate"
    }

    /// Called when the condition is pushed onto a stack.
    fn on_enter(&mut self) {}

    /// Returns `true` while evolution may continue.
    fn check(&mut self, population: &Population<C>) -> bool;
}

/// Lends a condition to a stack, so its state stays readable afterwards and
/// the same instance can be entered again.
impl<C, K> Condition<C> for &mut K
where
    K: Condition<C> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_enter(&mut self) {
        (**self).on_enter();
    }

    fn check(&mut self, population: &Population<C>) -> bool {
        (**self).check(population)
    }
}

/// A condition backed by a closure.
///
/// ```
/// use u_evol::{Condition, Population, PopulationConfig, Predicate};
///
/// let mut early = Predicate::new(|pop: &Population<i32>| pop.generation() < 3)
///     .with_name("first three generations");
/// let pop = Population::new(0..4, PopulationConfig::default()).unwrap();
/// assert!(early.check(&pop));
/// assert_eq!(early.name(), "first three generations");
/// ```
pub struct Predicate<F> {
    name: String,
    predicate: F,
}

impl<F> Predicate<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            name: "predicate".into(),
            predicate,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<C, F> Condition<C> for Predicate<F>
where
    F: FnMut(&Population<C>) -> bool,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&mut self, population: &Population<C>) -> bool {
        (self.predicate)(population)
    }
}

impl<F> std::fmt::Debug for Predicate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish()
    }
}
