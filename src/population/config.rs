//! Population and survival configuration.
//!
//! [`PopulationConfig`] fixes the optimization sense and the random seed of a
//! population. [`Survive`] describes how many individuals a
//! [`survive`](super::Population::survive) step keeps.

use crate::error::{EvolError, Result};

/// Configuration of a [`Population`](super::Population).
///
/// # Defaults
///
/// ```
/// use u_evol::PopulationConfig;
///
/// let config = PopulationConfig::default();
/// assert!(!config.maximize);
/// assert!(config.seed.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evol::PopulationConfig;
///
/// let config = PopulationConfig::default()
///     .with_maximize(true)
///     .with_seed(42)
///     .with_intended_size(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    /// Whether higher fitness is better.
    ///
    /// `false` (the default) treats lower fitness as better.
    pub maximize: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Size restored by [`breed`](super::Population::breed).
    ///
    /// `None` uses the size of the initial population.
    pub intended_size: Option<usize>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            maximize: false,
            seed: None,
            intended_size: None,
        }
    }
}

impl PopulationConfig {
    /// Sets the optimization sense.
    pub fn with_maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the intended population size.
    pub fn with_intended_size(mut self, size: usize) -> Self {
        self.intended_size = Some(size);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.intended_size == Some(0) {
            return Err(EvolError::Configuration(
                "intended_size must be positive or None".into(),
            ));
        }
        Ok(())
    }
}

/// Arguments of a survival step.
///
/// Exactly one of `fraction` and `n` must be set. The survivor count is
/// `ceil(fraction * len)` or `min(n, len)`.
///
/// ```
/// use u_evol::Survive;
///
/// let keep_half = Survive::fraction(0.5);
/// let keep_three_lucky = Survive::count(3).with_luck(true);
/// assert!(keep_half.validate().is_ok());
/// assert!(keep_three_lucky.validate().is_ok());
///
/// // Both set: rejected.
/// assert!(Survive::fraction(0.5).with_count(3).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Survive {
    /// Fraction of the current population to keep, in `(0, 1]`.
    pub fraction: Option<f64>,

    /// Absolute number of individuals to keep.
    pub n: Option<usize>,

    /// Draw survivors by fitness-proportionate sampling instead of
    /// keeping the top-ranked ones.
    pub luck: bool,
}

impl Survive {
    /// Keeps a fraction of the population.
    pub fn fraction(fraction: f64) -> Self {
        Self {
            fraction: Some(fraction),
            ..Self::default()
        }
    }

    /// Keeps `n` individuals.
    pub fn count(n: usize) -> Self {
        Self {
            n: Some(n),
            ..Self::default()
        }
    }

    /// Sets the fraction.
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }

    /// Sets the absolute count.
    pub fn with_count(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    /// Enables or disables lucky (fitness-proportionate) survival.
    pub fn with_luck(mut self, luck: bool) -> Self {
        self.luck = luck;
        self
    }

    /// Validates the arguments.
    pub fn validate(&self) -> Result<()> {
        match (self.fraction, self.n) {
            (None, None) => Err(EvolError::Configuration(
                "survive needs either fraction or n".into(),
            )),
            (Some(_), Some(_)) => Err(EvolError::Configuration(
                "survive takes fraction or n, not both".into(),
            )),
            (Some(f), None) if !(f > 0.0 && f <= 1.0) => Err(EvolError::Configuration(
                format!("survive fraction must be in (0, 1], got {f}"),
            )),
            (None, Some(0)) => Err(EvolError::Configuration(
                "survive n must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Number of survivors out of `len` individuals.
    ///
    /// Assumes [`validate`](Self::validate) passed.
    pub fn target(&self, len: usize) -> usize {
        match (self.fraction, self.n) {
            (Some(f), _) => ((f * len as f64).ceil() as usize).min(len),
            (None, Some(n)) => n.min(len),
            (None, None) => len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PopulationConfig::default();
        assert!(!config.maximize);
        assert!(config.seed.is_none());
        assert!(config.intended_size.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PopulationConfig::default()
            .with_maximize(true)
            .with_seed(7)
            .with_intended_size(20);
        assert!(config.maximize);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.intended_size, Some(20));
    }

    #[test]
    fn test_validate_zero_intended_size() {
        let config = PopulationConfig::default().with_intended_size(0);
        assert!(matches!(
            config.validate(),
            Err(EvolError::Configuration(_))
        ));
    }

    #[test]
    fn test_survive_needs_exactly_one() {
        assert!(Survive::default().validate().is_err());
        assert!(Survive::fraction(0.3).with_count(2).validate().is_err());
        assert!(Survive::fraction(0.3).validate().is_ok());
        assert!(Survive::count(2).validate().is_ok());
    }

    #[test]
    fn test_survive_fraction_bounds() {
        assert!(Survive::fraction(0.0).validate().is_err());
        assert!(Survive::fraction(1.5).validate().is_err());
        assert!(Survive::fraction(f64::NAN).validate().is_err());
        assert!(Survive::fraction(1.0).validate().is_ok());
        assert!(Survive::count(0).validate().is_err());
    }

    #[test]
    fn test_survive_target() {
        assert_eq!(Survive::fraction(0.5).target(10), 5);
        assert_eq!(Survive::fraction(0.25).target(10), 3);
        assert_eq!(Survive::fraction(0.01).target(10), 1);
        assert_eq!(Survive::count(4).target(10), 4);
        assert_eq!(Survive::count(40).target(10), 10);
    }

    #[test]
    fn test_luck_builder() {
        let s = Survive::count(3).with_luck(true);
        assert!(s.luck);
        assert_eq!(s.n, Some(3));
    }
}
