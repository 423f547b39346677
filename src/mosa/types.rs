//! Core trait definitions for the search engine.
//!
//! The engine never looks inside a candidate. It only needs the
//! capabilities described by [`Chromosome`], a list of
//! [`FitnessFunction`]s (one per coverage goal) and a [`MosaProblem`]
//! that ties them together.

use super::error::{ConstructionFailure, EvaluationError};
use rand::Rng;
use std::fmt;

/// Identity of a coverage goal.
///
/// The wrapped value is the position of the goal's fitness function in
/// [`MosaProblem::fitness_functions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoalId(pub usize);

impl GoalId {
    /// Position of the goal in the problem's goal list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate test case: an ordered sequence of opaque statements.
///
/// The engine relies on the `changed` flag to decide whether a bred
/// candidate is worth keeping and whether its cached fitness is stale.
/// Implementations must set the flag whenever [`mutate`](Chromosome::mutate)
/// or [`cross_over`](Chromosome::cross_over) alters the statement
/// sequence. Freshly created chromosomes are expected to report
/// `has_changed() == true`; the engine clears the flag after every
/// evaluation.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone, PartialEq)]
/// struct TestCase {
///     statements: Vec<Statement>,
///     changed: bool,
/// }
///
/// impl Chromosome for TestCase {
///     fn size(&self) -> usize { self.statements.len() }
///     fn has_changed(&self) -> bool { self.changed }
///     fn set_changed(&mut self, changed: bool) { self.changed = changed; }
///     fn mutate<R: Rng>(&mut self, rng: &mut R) { /* insert, delete, change */ }
/// }
/// ```
pub trait Chromosome: Clone + PartialEq + Send + Sync {
    /// Number of statements.
    fn size(&self) -> usize;

    /// Whether the structure changed since the flag was last cleared.
    fn has_changed(&self) -> bool;

    /// Sets or clears the `changed` flag.
    fn set_changed(&mut self, changed: bool);

    /// Applies one round of mutation in place.
    ///
    /// A mutation may legitimately leave the chromosome untouched; the
    /// engine retries once in that case.
    fn mutate<R: Rng>(&mut self, rng: &mut R);

    /// Replaces every statement from `position` onward with the
    /// statements of `other` starting at `other_position`.
    ///
    /// The default implementation reports [`ConstructionFailure::Unsupported`].
    fn cross_over(
        &mut self,
        _other: &Self,
        _position: usize,
        _other_position: usize,
    ) -> Result<(), ConstructionFailure> {
        Err(ConstructionFailure::Unsupported)
    }
}

/// Distance of a candidate to one coverage goal.
///
/// Returns `0.0` when the goal is covered and a larger non-negative value
/// the further away the candidate is. Must be deterministic for a given
/// chromosome content. Implementations typically run the chromosome
/// through an executor and may cache per chromosome.
pub trait FitnessFunction<C>: Send + Sync {
    /// Computes the fitness of `chromosome` for this goal.
    fn evaluate(&self, chromosome: &C) -> Result<f64, EvaluationError>;

    /// Label used in log output.
    fn name(&self) -> &str {
        "goal"
    }
}

/// Fitness function backed by a closure.
///
/// ```
/// use u_mosa::mosa::{FitnessFunction, FnFitness};
///
/// let goal = FnFitness::new("non-empty", |v: &Vec<u8>| Ok(if v.is_empty() { 1.0 } else { 0.0 }));
/// assert_eq!(goal.evaluate(&vec![1]).unwrap(), 0.0);
/// assert_eq!(goal.name(), "non-empty");
/// ```
pub struct FnFitness<F> {
    name: String,
    function: F,
}

impl<F> FnFitness<F> {
    /// Wraps `function` under the given label.
    pub fn new<C>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&C) -> Result<f64, EvaluationError> + Send + Sync,
    {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl<C, F> FitnessFunction<C> for FnFitness<F>
where
    F: Fn(&C) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, chromosome: &C) -> Result<f64, EvaluationError> {
        (self.function)(chromosome)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Snapshot handed to [`MosaProblem::on_generation`] once per generation.
#[derive(Debug)]
pub struct GenerationProgress<'a, C> {
    /// Generations completed so far.
    pub iteration: usize,

    /// Fraction of goals covered, in `[0, 1]`.
    pub coverage: f64,

    /// Number of covered goals.
    pub covered_goals: usize,

    /// Total number of goals.
    pub total_goals: usize,

    /// Current best individuals: the first non-dominated front of the
    /// population on the uncovered goals.
    pub best: Vec<&'a C>,

    /// Deduplicated archive solutions at the end of the generation.
    pub solutions: Vec<&'a C>,
}

/// Defines a test generation problem.
///
/// Bundles the chromosome factory, the goal list and the progress sink.
/// Breeding policies (selection, crossover, termination) are supplied
/// separately to the engine.
pub trait MosaProblem: Send + Sync {
    /// The candidate representation.
    type Chromosome: Chromosome;

    /// Creates a random chromosome.
    ///
    /// Used for the initial population and for random injection during
    /// breeding.
    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> Self::Chromosome;

    /// One fitness function per coverage goal.
    ///
    /// The slice must be identical for the lifetime of a run; a goal's
    /// [`GoalId`] is its index in this slice.
    fn fitness_functions(&self) -> &[Box<dyn FitnessFunction<Self::Chromosome>>];

    /// Called at the end of each generation.
    ///
    /// Must return quickly. The default implementation is a no-op.
    fn on_generation(&self, _progress: &GenerationProgress<'_, Self::Chromosome>) {}
}
