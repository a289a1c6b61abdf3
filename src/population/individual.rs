//! A single candidate solution and its cached fitness.

/// A chromosome together with its (possibly not yet computed) fitness.
///
/// Fitness is memoized: once [`evaluate`](Individual::evaluate) has run, later
/// calls return the cached value without invoking the evaluation function
/// again. The chromosome is never exposed mutably; operators that change it
/// build a new `Individual` with an empty cache.
///
/// ```
/// use u_evol::Individual;
///
/// let mut ind = Individual::new(vec![1.0, 2.0]);
/// assert!(!ind.is_evaluated());
/// let f = ind.evaluate(|genes: &Vec<f64>| genes.iter().sum());
/// assert_eq!(f, 3.0);
/// assert_eq!(ind.fitness(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual<C> {
    chromosome: C,
    fitness: Option<f64>,
}

impl<C> Individual<C> {
    /// Wraps a chromosome with no cached fitness.
    pub fn new(chromosome: C) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    /// Wraps a chromosome whose fitness is already known.
    pub fn with_fitness(chromosome: C, fitness: f64) -> Self {
        Self {
            chromosome,
            fitness: Some(fitness),
        }
    }

    pub fn chromosome(&self) -> &C {
        &self.chromosome
    }

    pub fn into_chromosome(self) -> C {
        self.chromosome
    }

    /// Cached fitness, `None` until evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Computes and caches the fitness, unless it is already cached.
    pub fn evaluate<F>(&mut self, eval: F) -> f64
    where
        F: FnOnce(&C) -> f64,
    {
        match self.fitness {
            Some(f) => f,
            None => {
                let f = eval(&self.chromosome);
                self.fitness = Some(f);
                f
            }
        }
    }

    /// Fallible form of [`evaluate`](Self::evaluate).
    ///
    /// The caller's error is returned unchanged and nothing is cached.
    pub fn try_evaluate<F, E>(&mut self, eval: F) -> std::result::Result<f64, E>
    where
        F: FnOnce(&C) -> std::result::Result<f64, E>,
    {
        match self.fitness {
            Some(f) => Ok(f),
            None => {
                let f = eval(&self.chromosome)?;
                self.fitness = Some(f);
                Ok(f)
            }
        }
    }
}
