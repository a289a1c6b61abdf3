//! The population and its chainable pipeline operators.
//!
//! Every operator works in place and hands back `&mut Self` (or a `Result`
//! of it), so `pop.a()?.b()` always applies `b` to exactly what `a` left
//! behind. A [`Population`] is `Clone` whenever its chromosome is, which
//! makes snapshots between steps trivial.

use super::config::{PopulationConfig, Survive};
use super::individual::Individual;
use super::selection::{compare_fitness, fitness_weights, rank_order, sample_without_replacement};
use crate::conditions::ConditionStack;
use crate::error::{EvolError, Result};
use crate::evolution::Evolution;
use crate::random::{rng_from_option, EvolRng};
use rand::Rng;
use std::cmp::Ordering;
use std::sync::Arc;

/// Evaluation function bound to a population.
pub type Evaluator<C> = Arc<dyn Fn(&C) -> f64 + Send + Sync>;

/// An ordered collection of individuals plus a generation counter.
///
/// # Usage
///
/// ```
/// use u_evol::{Population, PopulationConfig, Selection, Survive};
///
/// let config = PopulationConfig::default().with_seed(42);
/// let mut pop = Population::new((0..20).map(|x| x as f64), config)
///     .unwrap()
///     .with_evaluator(|x: &f64| (x - 7.0).abs());
///
/// pop.evaluate()
///     .unwrap()
///     .survive(Survive::fraction(0.25))
///     .unwrap()
///     .breed(Selection::Random.picker(2, false), |parents, _rng| {
///         (parents[0] + parents[1]) / 2.0
///     })
///     .unwrap();
///
/// assert_eq!(pop.len(), 20);
/// assert_eq!(pop.current_best().unwrap().chromosome(), &7.0);
/// ```
#[derive(Clone)]
pub struct Population<C> {
    individuals: Vec<Individual<C>>,
    generation: usize,
    intended_size: usize,
    maximize: bool,
    eval_function: Option<Evaluator<C>>,
    documented_best: Option<Individual<C>>,
    rng: EvolRng,
}

impl<C> Population<C> {
    /// Builds a population from explicit chromosomes.
    pub fn new<I>(chromosomes: I, config: PopulationConfig) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
    {
        config.validate()?;
        let individuals: Vec<Individual<C>> =
            chromosomes.into_iter().map(Individual::new).collect();
        Ok(Self {
            intended_size: config.intended_size.unwrap_or(individuals.len()),
            individuals,
            generation: 0,
            maximize: config.maximize,
            eval_function: None,
            documented_best: None,
            rng: rng_from_option(config.seed),
        })
    }

    /// Builds a population by calling `init` `size` times.
    pub fn generate<F>(mut init: F, size: usize, config: PopulationConfig) -> Result<Self>
    where
        F: FnMut(&mut EvolRng) -> C,
    {
        config.validate()?;
        let mut rng = rng_from_option(config.seed);
        let individuals: Vec<Individual<C>> =
            (0..size).map(|_| Individual::new(init(&mut rng))).collect();
        Ok(Self {
            intended_size: config.intended_size.unwrap_or(size),
            individuals,
            generation: 0,
            maximize: config.maximize,
            eval_function: None,
            documented_best: None,
            rng,
        })
    }

    /// Binds the evaluation function used by [`evaluate`](Self::evaluate).
    pub fn with_evaluator<F>(mut self, eval: F) -> Self
    where
        F: Fn(&C) -> f64 + Send + Sync + 'static,
    {
        self.eval_function = Some(Arc::new(eval));
        self
    }

    /// Replaces the bound evaluation function.
    pub fn set_evaluator<F>(&mut self, eval: F)
    where
        F: Fn(&C) -> f64 + Send + Sync + 'static,
    {
        self.eval_function = Some(Arc::new(eval));
    }

    pub fn evaluator(&self) -> Option<&Evaluator<C>> {
        self.eval_function.as_ref()
    }

    pub fn individuals(&self) -> &[Individual<C>] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Individual<C>> {
        self.individuals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual<C>> {
        self.individuals.iter()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Size that [`breed`](Self::breed) restores.
    pub fn intended_size(&self) -> usize {
        self.intended_size
    }

    pub fn set_intended_size(&mut self, size: usize) {
        self.intended_size = size;
    }

    pub fn maximize(&self) -> bool {
        self.maximize
    }

    /// The population's random generator.
    pub fn rng(&mut self) -> &mut EvolRng {
        &mut self.rng
    }

    /// Best evaluated individual of the current population.
    pub fn current_best(&self) -> Option<&Individual<C>> {
        self.extreme(Ordering::Less)
    }

    /// Worst evaluated individual of the current population.
    pub fn current_worst(&self) -> Option<&Individual<C>> {
        self.extreme(Ordering::Greater)
    }

    /// Fitness of [`current_best`](Self::current_best).
    pub fn best_fitness(&self) -> Option<f64> {
        self.current_best().and_then(Individual::fitness)
    }

    /// Best individual ever evaluated in this population.
    pub fn documented_best(&self) -> Option<&Individual<C>> {
        self.documented_best.as_ref()
    }

    fn extreme(&self, wanted: Ordering) -> Option<&Individual<C>> {
        let maximize = self.maximize;
        self.individuals
            .iter()
            .filter_map(|ind| ind.fitness().map(|f| (ind, f)))
            .reduce(|kept, next| {
                if compare_fitness(next.1, kept.1, maximize) == wanted {
                    next
                } else {
                    kept
                }
            })
            .map(|(ind, _)| ind)
    }
}

impl<C: Clone> Population<C> {
    /// Evaluates every individual lacking a fitness with the bound function.
    ///
    /// # Errors
    /// [`EvolError::MissingEvaluator`] if no function is bound.
    pub fn evaluate(&mut self) -> Result<&mut Self> {
        let eval = self
            .eval_function
            .clone()
            .ok_or(EvolError::MissingEvaluator)?;
        Ok(self.evaluate_with(|c| eval(c)))
    }

    /// Evaluates every individual lacking a fitness with `eval`.
    ///
    /// `eval` takes precedence over the bound function for this call only.
    pub fn evaluate_with<F>(&mut self, mut eval: F) -> &mut Self
    where
        F: FnMut(&C) -> f64,
    {
        for ind in self.individuals.iter_mut() {
            ind.evaluate(&mut eval);
        }
        self.document_best();
        self
    }

    /// Fallible form of [`evaluate_with`](Self::evaluate_with).
    ///
    /// Stops at the first error, which is returned unchanged. Individuals
    /// evaluated before the failure keep their fitness.
    pub fn try_evaluate_with<F, E>(&mut self, mut eval: F) -> std::result::Result<&mut Self, E>
    where
        F: FnMut(&C) -> std::result::Result<f64, E>,
    {
        let outcome = self
            .individuals
            .iter_mut()
            .try_for_each(|ind| ind.try_evaluate(&mut eval).map(|_| ()));
        self.document_best();
        outcome.map(|()| self)
    }

    /// Evaluates unevaluated individuals in parallel with the bound function.
    #[cfg(feature = "parallel")]
    pub fn par_evaluate(&mut self) -> Result<&mut Self>
    where
        C: Send + Sync,
    {
        use rayon::prelude::*;

        let eval = self
            .eval_function
            .clone()
            .ok_or(EvolError::MissingEvaluator)?;
        self.individuals
            .par_iter_mut()
            .filter(|ind| !ind.is_evaluated())
            .for_each(|ind| {
                ind.evaluate(|c| eval(c));
            });
        self.document_best();
        Ok(self)
    }

    fn evaluate_lazily(&mut self) {
        if let Some(eval) = self.eval_function.clone() {
            self.evaluate_with(|c| eval(c));
        }
    }

    fn document_best(&mut self) {
        let maximize = self.maximize;
        let improved = match (self.current_best(), &self.documented_best) {
            (Some(best), Some(known)) => match (best.fitness(), known.fitness()) {
                (Some(a), Some(b)) => compare_fitness(a, b, maximize) == Ordering::Less,
                _ => false,
            },
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            self.documented_best = self.current_best().cloned();
        }
    }

    /// Replaces each chromosome with `mutate(chromosome)` with the given
    /// probability. Mutated individuals lose their cached fitness.
    ///
    /// # Errors
    /// [`EvolError::Configuration`] if `probability` is outside `[0, 1]`.
    pub fn mutate<F>(&mut self, mut mutate: F, probability: f64) -> Result<&mut Self>
    where
        F: FnMut(&C, &mut EvolRng) -> C,
    {
        self.try_mutate(|c, rng| Ok::<C, EvolError>(mutate(c, rng)), probability)
    }

    /// Fallible form of [`mutate`](Self::mutate).
    pub fn try_mutate<F, E>(&mut self, mut mutate: F, probability: f64) -> std::result::Result<&mut Self, E>
    where
        F: FnMut(&C, &mut EvolRng) -> std::result::Result<C, E>,
        E: From<EvolError>,
    {
        check_probability(probability)?;
        for ind in self.individuals.iter_mut() {
            if self.rng.random_bool(probability) {
                *ind = Individual::new(mutate(ind.chromosome(), &mut self.rng)?);
            }
        }
        Ok(self)
    }

    /// Reduces the population according to `survive`.
    ///
    /// Without luck the best-ranked individuals survive, best first. With
    /// luck survivors are drawn by fitness-proportionate sampling without
    /// replacement.
    ///
    /// # Errors
    /// - [`EvolError::Configuration`] for invalid `survive` arguments
    /// - [`EvolError::Unevaluated`] if any individual has no fitness
    pub fn survive(&mut self, survive: Survive) -> Result<&mut Self> {
        survive.validate()?;
        let order = rank_order(&self.individuals, self.maximize)?;
        let target = survive.target(self.individuals.len());

        let chosen: Vec<usize> = if survive.luck {
            let fitnesses: Vec<f64> = self
                .individuals
                .iter()
                .filter_map(Individual::fitness)
                .collect();
            let weights = fitness_weights(&fitnesses, self.maximize);
            sample_without_replacement(&weights, target, &mut self.rng)
        } else {
            order[..target].to_vec()
        };

        log::trace!(
            "survive: {} -> {} (luck: {})",
            self.individuals.len(),
            chosen.len(),
            survive.luck
        );

        let mut slots: Vec<Option<Individual<C>>> =
            self.individuals.drain(..).map(Some).collect();
        self.individuals = chosen.iter().filter_map(|&i| slots[i].take()).collect();
        Ok(self)
    }

    /// Refills the population up to its intended size.
    ///
    /// `picker` receives the current individuals and returns the indices of
    /// the parents of one child; `combiner` builds the child chromosome from
    /// those parents. Existing individuals are kept.
    ///
    /// # Errors
    /// - [`EvolError::EmptyPopulation`] if there is nobody to breed from
    /// - [`EvolError::NoParents`] / [`EvolError::ParentOutOfRange`] for a
    ///   misbehaving picker
    pub fn breed<P, F>(&mut self, picker: P, combiner: F) -> Result<&mut Self>
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize>,
        F: FnMut(&[&C], &mut EvolRng) -> C,
    {
        let target = self.intended_size;
        self.breed_to(target, picker, combiner)
    }

    /// Like [`breed`](Self::breed), with an explicit target size.
    pub fn breed_to<P, F>(&mut self, size: usize, picker: P, mut combiner: F) -> Result<&mut Self>
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize>,
        F: FnMut(&[&C], &mut EvolRng) -> C,
    {
        self.breed_inner(size, &mut (), picker, |_: &mut (), parents: &[&C], rng: &mut EvolRng| {
            Ok::<C, EvolError>(combiner(parents, rng))
        })?;
        Ok(self)
    }

    /// Like [`breed`](Self::breed), threading shared mutable state through
    /// every call of `combiner`.
    ///
    /// Use this instead of capturing external state when children are built
    /// from information that outlives a single generation.
    pub fn breed_with_context<X, P, F>(
        &mut self,
        context: &mut X,
        picker: P,
        mut combiner: F,
    ) -> Result<&mut Self>
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize>,
        F: FnMut(&mut X, &[&C], &mut EvolRng) -> C,
    {
        let target = self.intended_size;
        self.breed_inner(target, context, picker, |ctx: &mut X, parents: &[&C], rng: &mut EvolRng| {
            Ok::<C, EvolError>(combiner(ctx, parents, rng))
        })?;
        Ok(self)
    }

    /// Fallible form of [`breed`](Self::breed).
    ///
    /// If `combiner` fails, no offspring are added and its error is returned
    /// unchanged.
    pub fn try_breed<P, F, E>(&mut self, picker: P, mut combiner: F) -> std::result::Result<&mut Self, E>
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize>,
        F: FnMut(&[&C], &mut EvolRng) -> std::result::Result<C, E>,
        E: From<EvolError>,
    {
        let target = self.intended_size;
        self.breed_inner(target, &mut (), picker, |_: &mut (), parents: &[&C], rng: &mut EvolRng| {
            combiner(parents, rng)
        })?;
        Ok(self)
    }

    fn breed_inner<X, P, F, E>(
        &mut self,
        target: usize,
        context: &mut X,
        mut picker: P,
        mut combiner: F,
    ) -> std::result::Result<(), E>
    where
        P: FnMut(&[Individual<C>], &mut EvolRng) -> Vec<usize>,
        F: FnMut(&mut X, &[&C], &mut EvolRng) -> std::result::Result<C, E>,
        E: From<EvolError>,
    {
        let pool = self.individuals.len();
        if pool >= target {
            return Ok(());
        }
        if pool == 0 {
            return Err(EvolError::EmptyPopulation.into());
        }

        let mut offspring = Vec::with_capacity(target - pool);
        while pool + offspring.len() < target {
            let picked = picker(self.individuals.as_slice(), &mut self.rng);
            if picked.is_empty() {
                return Err(EvolError::NoParents.into());
            }

            let mut parents = Vec::with_capacity(picked.len());
            for index in picked {
                let parent = self
                    .individuals
                    .get(index)
                    .ok_or(EvolError::ParentOutOfRange { index, len: pool })?;
                parents.push(parent.chromosome());
            }

            let child = combiner(context, &parents, &mut self.rng)?;
            offspring.push(Individual::new(child));
        }

        log::trace!("breed: {} -> {}", pool, target);
        self.individuals.extend(offspring);
        Ok(())
    }

    /// Keeps only the individuals for which `keep` returns `true`.
    pub fn filter<F>(&mut self, keep: F) -> &mut Self
    where
        F: FnMut(&Individual<C>) -> bool,
    {
        self.individuals.retain(keep);
        self
    }

    /// Replaces every chromosome with `f(chromosome)`; fitness is reset.
    pub fn map<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&C) -> C,
    {
        for ind in self.individuals.iter_mut() {
            *ind = Individual::new(f(ind.chromosome()));
        }
        self
    }

    /// Runs a side-effecting function on the population.
    pub fn callback<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&Self),
    {
        f(self);
        self
    }

    /// Applies `evolution` `n` times without consulting any condition.
    ///
    /// Behaves exactly like [`evolve_with`](Self::evolve_with) on an empty
    /// stack.
    pub fn evolve<'e>(&mut self, evolution: &mut Evolution<'e, C>, n: usize) -> Result<&mut Self>
    where
        C: 'e,
    {
        let conditions = ConditionStack::new();
        self.evolve_with(&conditions, evolution, n)
    }

    /// Applies `evolution` up to `n` times, consulting `conditions` before
    /// every generation.
    ///
    /// Before every generation, individuals without a fitness are evaluated
    /// with the bound function (if any), so conditions and the first step
    /// see an evaluated population.
    ///
    /// When a condition fails the loop ends and the population is returned
    /// as of the last completed generation; this is not an error. Errors
    /// raised by the evolution's steps propagate and leave the generation
    /// counter untouched for the failed step.
    pub fn evolve_with<'e>(
        &mut self,
        conditions: &ConditionStack<'_, C>,
        evolution: &mut Evolution<'e, C>,
        n: usize,
    ) -> Result<&mut Self>
    where
        C: 'e,
    {
        for _ in 0..n {
            self.evaluate_lazily();
            if let Err(stop) = conditions.check(self) {
                log::debug!("{stop}");
                break;
            }

            evolution.apply(self)?;
            self.generation += 1;
            log::trace!(
                "{}: generation {} complete, best {:?}",
                evolution.name().unwrap_or("evolution"),
                self.generation,
                self.best_fitness()
            );
        }
        Ok(self)
    }
}

fn check_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(EvolError::Configuration(format!(
            "probability must be in [0, 1], got {probability}"
        )))
    }
}

impl<C> std::fmt::Debug for Population<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("size", &self.individuals.len())
            .field("intended_size", &self.intended_size)
            .field("generation", &self.generation)
            .field("maximize", &self.maximize)
            .field("best_fitness", &self.best_fitness())
            .finish()
    }
}

impl<'p, C> IntoIterator for &'p Population<C> {
    type Item = &'p Individual<C>;
    type IntoIter = std::slice::Iter<'p, Individual<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Selection;
    use proptest::prelude::*;
    use rand::Rng;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn squares(n: i64, maximize: bool) -> Population<i64> {
        let config = PopulationConfig::default().with_seed(42).with_maximize(maximize);
        Population::new(0..n, config)
            .unwrap()
            .with_evaluator(|x: &i64| (x * x) as f64)
    }

    fn average(parents: &[&i64], _rng: &mut EvolRng) -> i64 {
        parents.iter().copied().sum::<i64>() / parents.len() as i64
    }

    #[test]
    fn test_new_and_generate() {
        let pop = squares(10, false);
        assert_eq!(pop.len(), 10);
        assert_eq!(pop.intended_size(), 10);
        assert_eq!(pop.generation(), 0);
        assert!(pop.iter().all(|ind| !ind.is_evaluated()));

        let config = PopulationConfig::default().with_seed(1);
        let pop = Population::generate(|rng| rng.random_range(0..100), 25, config).unwrap();
        assert_eq!(pop.len(), 25);
        assert_eq!(pop.intended_size(), 25);
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = PopulationConfig::default().with_seed(9);
        let a = Population::generate(|rng| rng.random::<u32>(), 10, config.clone()).unwrap();
        let b = Population::generate(|rng| rng.random::<u32>(), 10, config).unwrap();
        let ca: Vec<u32> = a.iter().map(|i| *i.chromosome()).collect();
        let cb: Vec<u32> = b.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(ca, cb);
    }

    #[test]
    fn test_intended_size_from_config() {
        let config = PopulationConfig::default().with_intended_size(30);
        let pop = Population::new(0..10, config).unwrap();
        assert_eq!(pop.intended_size(), 30);

        let bad = PopulationConfig::default().with_intended_size(0);
        assert!(Population::new(0..10, bad).is_err());
    }

    #[test]
    fn test_evaluate_counts_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut pop = Population::new(0..5i64, PopulationConfig::default())
            .unwrap()
            .with_evaluator(move |x: &i64| {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
                *x as f64
            });

        pop.evaluate().unwrap();
        let first: Vec<Option<f64>> = pop.iter().map(Individual::fitness).collect();
        pop.evaluate().unwrap();
        let second: Vec<Option<f64>> = pop.iter().map(Individual::fitness).collect();

        assert_eq!(calls.load(AtomicOrdering::SeqCst), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_without_evaluator() {
        let mut pop = Population::new(0..3, PopulationConfig::default()).unwrap();
        assert!(matches!(pop.evaluate(), Err(EvolError::MissingEvaluator)));

        pop.evaluate_with(|x: &i32| *x as f64);
        assert!(pop.iter().all(Individual::is_evaluated));
    }

    #[test]
    fn test_evaluate_with_overrides_bound_function() {
        let mut pop = squares(4, false);
        pop.evaluate_with(|x| -(*x as f64));
        let fitness: Vec<f64> = pop.iter().filter_map(Individual::fitness).collect();
        assert_eq!(fitness, vec![0.0, -1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_try_evaluate_with_propagates_error() {
        let mut pop = squares(5, false);
        let result = pop.try_evaluate_with(|x| if *x < 3 { Ok(*x as f64) } else { Err("too big") });
        assert_eq!(result.err(), Some("too big"));
        let evaluated = pop.iter().filter(|i| i.is_evaluated()).count();
        assert_eq!(evaluated, 3);
    }

    #[test]
    fn test_current_best_and_worst() {
        let mut pop = squares(5, false);
        assert!(pop.current_best().is_none());
        pop.evaluate().unwrap();
        assert_eq!(pop.current_best().unwrap().chromosome(), &0);
        assert_eq!(pop.current_worst().unwrap().chromosome(), &4);

        let mut pop = squares(5, true);
        pop.evaluate().unwrap();
        assert_eq!(pop.current_best().unwrap().chromosome(), &4);
        assert_eq!(pop.best_fitness(), Some(16.0));
    }

    #[test]
    fn test_documented_best_survives_losses() {
        let mut pop = squares(5, false);
        pop.evaluate().unwrap();
        pop.filter(|ind| *ind.chromosome() > 2);
        assert_eq!(pop.current_best().unwrap().chromosome(), &3);
        assert_eq!(pop.documented_best().unwrap().chromosome(), &0);
    }

    #[test]
    fn test_mutate_invalidates_fitness() {
        let mut pop = squares(5, false);
        pop.evaluate().unwrap();
        pop.mutate(|x, _| x + 10, 1.0).unwrap();
        assert!(pop.iter().all(|ind| !ind.is_evaluated()));
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_mutate_zero_probability_is_noop() {
        let mut pop = squares(5, false);
        pop.evaluate().unwrap();
        pop.mutate(|_, _| panic!("must not mutate"), 0.0).unwrap();
        assert!(pop.iter().all(Individual::is_evaluated));
    }

    #[test]
    fn test_mutate_rejects_bad_probability() {
        let mut pop = squares(5, false);
        assert!(matches!(
            pop.mutate(|x, _| *x, 1.5),
            Err(EvolError::Configuration(_))
        ));
        assert!(pop.mutate(|x, _| *x, -0.1).is_err());
    }

    #[test]
    fn test_mutate_partial_probability() {
        let mut pop = squares(1000, false);
        pop.mutate(|x, _| x + 1_000_000, 0.5).unwrap();
        let mutated = pop.iter().filter(|i| *i.chromosome() >= 1_000_000).count();
        assert!(mutated > 400 && mutated < 600, "mutated {mutated}/1000");
    }

    #[derive(Debug, PartialEq)]
    enum MyError {
        Odd(i64),
        Evol(String),
    }

    impl From<EvolError> for MyError {
        fn from(err: EvolError) -> Self {
            MyError::Evol(err.to_string())
        }
    }

    #[test]
    fn test_try_mutate_propagates_error() {
        let mut pop = squares(5, false);
        let result = pop.try_mutate(
            |x, _| if x % 2 == 1 { Err(MyError::Odd(*x)) } else { Ok(*x) },
            1.0,
        );
        assert_eq!(result.err(), Some(MyError::Odd(1)));

        let result = pop.try_mutate(|x, _| Ok::<i64, MyError>(*x), 2.0);
        assert!(matches!(result.err(), Some(MyError::Evol(_))));
    }

    #[test]
    fn test_survive_keeps_top_fraction() {
        let mut pop = squares(10, false);
        pop.evaluate().unwrap().survive(Survive::fraction(0.3)).unwrap();
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![0, 1, 2]);
        assert_eq!(pop.intended_size(), 10);
    }

    #[test]
    fn test_survive_maximize_count() {
        let mut pop = squares(10, true);
        pop.evaluate().unwrap().survive(Survive::count(2)).unwrap();
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![9, 8]);
    }

    #[test]
    fn test_survive_requires_evaluation() {
        let mut pop = squares(10, false);
        assert!(matches!(
            pop.survive(Survive::fraction(0.5)),
            Err(EvolError::Unevaluated { index: 0 })
        ));
    }

    #[test]
    fn test_survive_configuration_errors() {
        let mut pop = squares(10, false);
        pop.evaluate().unwrap();
        assert!(pop.survive(Survive::default()).is_err());
        assert!(pop.survive(Survive::fraction(0.5).with_count(2)).is_err());
        assert_eq!(pop.len(), 10);
    }

    #[test]
    fn test_survive_with_luck() {
        let mut pop = squares(20, false);
        pop.evaluate()
            .unwrap()
            .survive(Survive::count(8).with_luck(true))
            .unwrap();
        assert_eq!(pop.len(), 8);
        let mut genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        genes.sort_unstable();
        genes.dedup();
        assert_eq!(genes.len(), 8, "lucky survivors must be distinct");
    }

    #[test]
    fn test_breed_restores_size_and_keeps_survivors() {
        let mut pop = squares(10, false);
        pop.evaluate()
            .unwrap()
            .survive(Survive::fraction(0.2))
            .unwrap()
            .breed(Selection::Random.picker(2, false), average)
            .unwrap();

        assert_eq!(pop.len(), 10);
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(&genes[..2], &[0, 1]);
        assert!(pop.individuals()[2..].iter().all(|i| !i.is_evaluated()));
    }

    #[test]
    fn test_breed_to_explicit_size() {
        let mut pop = squares(4, false);
        pop.breed_to(9, |_, _| vec![0, 3], average).unwrap();
        assert_eq!(pop.len(), 9);
        assert!(pop.individuals()[4..].iter().all(|i| *i.chromosome() == 1));
    }

    #[test]
    fn test_breed_picker_errors() {
        let mut pop = squares(3, false);
        pop.set_intended_size(5);
        assert!(matches!(
            pop.breed(|_, _| Vec::new(), average),
            Err(EvolError::NoParents)
        ));
        assert!(matches!(
            pop.breed(|_, _| vec![7], average),
            Err(EvolError::ParentOutOfRange { index: 7, len: 3 })
        ));
        assert_eq!(pop.len(), 3);

        let mut empty = Population::new(Vec::<i64>::new(), PopulationConfig::default().with_intended_size(2))
            .unwrap();
        assert!(matches!(
            empty.breed(|_, _| vec![0], average),
            Err(EvolError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_try_breed_adds_nothing_on_error() {
        let mut pop = squares(3, false);
        pop.set_intended_size(6);
        let mut made = 0;
        let result = pop.try_breed(
            |_, _| vec![0],
            |_, _| {
                made += 1;
                if made < 3 {
                    Ok(42)
                } else {
                    Err(MyError::Odd(made))
                }
            },
        );
        assert_eq!(result.err(), Some(MyError::Odd(3)));
        assert_eq!(pop.len(), 3);
    }

    #[test]
    fn test_breed_with_context() {
        let mut pop = squares(2, false);
        pop.set_intended_size(5);
        let mut counter = 100i64;
        pop.breed_with_context(&mut counter, |_, _| vec![0], |ctx, _, _| {
            *ctx += 1;
            *ctx
        })
        .unwrap();
        assert_eq!(counter, 103);
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![0, 1, 101, 102, 103]);
    }

    #[test]
    fn test_map_and_callback() {
        let mut pop = squares(3, false);
        pop.evaluate().unwrap();
        let mut seen = 0;
        pop.map(|x| x * 2).callback(|p| seen = p.len());
        assert_eq!(seen, 3);
        assert!(pop.iter().all(|i| !i.is_evaluated()));
        let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![0, 2, 4]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut pop = squares(4, false);
        pop.evaluate().unwrap();
        let snapshot = pop.clone();
        pop.survive(Survive::count(1)).unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_evolve_counts_generations() {
        let mut evo = Evolution::new()
            .survive(Survive::fraction(0.5))
            .breed(Selection::Tournament(2).picker(2, false), average)
            .evaluate();
        let mut pop = squares(10, false);
        pop.evaluate().unwrap();
        pop.evolve(&mut evo, 7).unwrap();
        assert_eq!(pop.generation(), 7);
        assert_eq!(pop.len(), 10);
    }

    #[test]
    fn test_evolve_step_error_propagates() {
        // Nothing bound, so survive meets an unevaluated population.
        let mut evo = Evolution::new().survive(Survive::fraction(0.5));
        let mut pop = Population::new(0..10i64, PopulationConfig::default()).unwrap();
        assert!(matches!(
            pop.evolve(&mut evo, 3),
            Err(EvolError::Unevaluated { .. })
        ));
        assert_eq!(pop.generation(), 0);
    }

    #[test]
    fn test_evolve_matches_evolve_with_empty_stack() {
        let evolution = || {
            Evolution::new()
                .survive(Survive::fraction(0.5))
                .breed(Selection::Random.picker(2, false), average)
                .evaluate()
        };

        let mut plain = squares(20, false);
        let mut evo = evolution();
        plain.evolve(&mut evo, 3).unwrap();

        let mut scoped = squares(20, false);
        let mut evo = evolution();
        let stack = ConditionStack::new();
        scoped.evolve_with(&stack, &mut evo, 3).unwrap();

        assert_eq!(plain.generation(), 3);
        assert_eq!(scoped.generation(), 3);
        let a: Vec<i64> = plain.iter().map(|i| *i.chromosome()).collect();
        let b: Vec<i64> = scoped.iter().map(|i| *i.chromosome()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_evolve_evaluates_fresh_population() {
        let mut evo = Evolution::new()
            .survive(Survive::count(3))
            .breed(Selection::Random.picker(2, false), average);
        let mut pop = squares(10, false);
        pop.evolve(&mut evo, 1).unwrap();
        assert_eq!(pop.generation(), 1);
        let genes: Vec<i64> = pop.iter().take(3).map(|i| *i.chromosome()).collect();
        assert_eq!(genes, vec![0, 1, 2]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_evaluate_matches_sequential() {
        let mut a = squares(50, false);
        let mut b = squares(50, false);
        a.evaluate().unwrap();
        b.par_evaluate().unwrap();
        let fa: Vec<Option<f64>> = a.iter().map(Individual::fitness).collect();
        let fb: Vec<Option<f64>> = b.iter().map(Individual::fitness).collect();
        assert_eq!(fa, fb);
    }

    proptest! {
        #[test]
        fn prop_survive_fraction_keeps_ceil_top(n in 1i64..120, fraction in 0.01f64..=1.0) {
            let mut pop = squares(n, false);
            pop.evaluate().unwrap().survive(Survive::fraction(fraction)).unwrap();

            let expected = (fraction * n as f64).ceil() as usize;
            prop_assert_eq!(pop.len(), expected);
            let genes: Vec<i64> = pop.iter().map(|i| *i.chromosome()).collect();
            let top: Vec<i64> = (0..expected as i64).collect();
            prop_assert_eq!(genes, top);
        }

        #[test]
        fn prop_evolve_advances_by_n(n in 0usize..20, size in 2i64..30) {
            let mut evo = Evolution::new()
                .evaluate()
                .survive(Survive::count(1))
                .breed(Selection::Random.picker(1, false), average);
            let mut pop = squares(size, true);
            pop.evolve(&mut evo, n).unwrap();
            prop_assert_eq!(pop.generation(), n);
            prop_assert_eq!(pop.len(), size as usize);
        }
    }
}
