//! Search configuration.
//!
//! [`MosaConfig`] holds all parameters that control the generational loop.

use super::error::{MosaError, Result};
use super::selection::Selection;
use super::stopping::{AnyOf, MaxIterations, MaxTime};
use std::time::Duration;

/// Configuration for the many-objective search.
///
/// # Defaults
///
/// ```
/// use u_mosa::mosa::MosaConfig;
///
/// let config = MosaConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_chromosome_size, 40);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_mosa::mosa::{MosaConfig, Selection};
///
/// let config = MosaConfig::default()
///     .with_population_size(100)
///     .with_selection(Selection::Tournament(2))
///     .with_crossover_rate(0.8)
///     .with_test_insertion_probability(0.2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MosaConfig {
    /// Target population size after every generation.
    pub population_size: usize,

    /// Maximum number of generations. `0` runs initialization only.
    pub max_iterations: usize,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation, so a run may overshoot
    /// by at most one generation's worth of work.
    pub time_limit_ms: Option<u64>,

    /// Selection strategy for choosing parents.
    pub selection: Selection,

    /// Probability of recombining a pair of offspring (0.0–1.0).
    pub crossover_rate: f64,

    /// Fraction of the population injected as fresh random material per
    /// generation (0.0–1.0).
    pub test_insertion_probability: f64,

    /// Upper bound on the number of statements in a crossover child.
    pub max_chromosome_size: usize,

    /// Whether to evaluate fitness in parallel using rayon.
    ///
    /// Ignored unless the `parallel` feature is enabled.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for MosaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_iterations: 500,
            time_limit_ms: None,
            selection: Selection::default(),
            crossover_rate: 0.75,
            test_insertion_probability: 0.1,
            max_chromosome_size: 40,
            parallel: true,
            seed: None,
        }
    }
}

impl MosaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for a crowded tournament of size `k`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the random injection probability.
    pub fn with_test_insertion_probability(mut self, p: f64) -> Self {
        self.test_insertion_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the maximum chromosome size for crossover children.
    pub fn with_max_chromosome_size(mut self, n: usize) -> Self {
        self.max_chromosome_size = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick smoke runs.
    ///
    /// - Population: 20, Generations: 50, Time limit: 10s
    pub fn fast() -> Self {
        Self {
            population_size: 20,
            max_iterations: 50,
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Preset balancing coverage against run time.
    ///
    /// - Population: 50, Generations: 200, Time limit: 60s
    pub fn balanced() -> Self {
        Self {
            population_size: 50,
            max_iterations: 200,
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Preset for large subjects with many goals.
    ///
    /// - Population: 100, Generations: 1000, Time limit: 600s
    pub fn quality() -> Self {
        Self {
            population_size: 100,
            max_iterations: 1000,
            time_limit_ms: Some(600_000),
            ..Self::default()
        }
    }

    /// The computation budget described by this configuration.
    pub fn budget(&self) -> AnyOf {
        let budget = AnyOf::new().or(MaxIterations(self.max_iterations));
        match self.time_limit_ms {
            Some(ms) => budget.or(MaxTime(Duration::from_millis(ms))),
            None => budget,
        }
    }

    /// Number of random individuals injected per generation.
    pub fn insertions_per_generation(&self) -> usize {
        (self.population_size as f64 * self.test_insertion_probability) as usize
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`MosaError::InvalidConfig`] describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(MosaError::InvalidConfig(msg.into()));
        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid("crossover_rate must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.test_insertion_probability) {
            return invalid("test_insertion_probability must be within [0, 1]");
        }
        if self.max_chromosome_size == 0 {
            return invalid("max_chromosome_size must be at least 1");
        }
        if self.time_limit_ms == Some(0) {
            return invalid("time_limit_ms must be positive or None");
        }
        if self.selection == Selection::Tournament(0) {
            return invalid("tournament size must be at least 1");
        }
        Ok(())
    }
}
