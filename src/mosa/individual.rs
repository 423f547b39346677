//! Engine-side wrapper around a chromosome.

use super::error::{MosaError, Result};
use super::types::{Chromosome, FitnessFunction, GoalId};
use rand::Rng;

/// A chromosome together with the bookkeeping the engine needs.
///
/// Holds a per-run identity, the per-goal fitness cache, and the rank and
/// crowding distance assigned by the last truncation. Any structural
/// change made through the wrapper drops the fitness cache.
#[derive(Debug, Clone)]
pub struct Individual<C> {
    id: u64,
    chromosome: C,
    fitness: Option<Vec<f64>>,
    rank: usize,
    distance: f64,
}

impl<C: Chromosome> Individual<C> {
    /// Wraps an unevaluated chromosome.
    pub fn new(id: u64, chromosome: C) -> Self {
        Self {
            id,
            chromosome,
            fitness: None,
            rank: usize::MAX,
            distance: 0.0,
        }
    }

    /// Per-run identity. Clones made for breeding get a fresh id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The wrapped chromosome.
    pub fn chromosome(&self) -> &C {
        &self.chromosome
    }

    /// Unwraps the chromosome.
    pub fn into_chromosome(self) -> C {
        self.chromosome
    }

    /// Mutable access to the chromosome. Invalidates the fitness cache.
    pub fn chromosome_mut(&mut self) -> &mut C {
        self.fitness = None;
        &mut self.chromosome
    }

    /// Cached fitness per goal, or `None` if stale.
    pub fn fitness(&self) -> Option<&[f64]> {
        self.fitness.as_deref()
    }

    /// Cached fitness for one goal.
    pub fn goal_fitness(&self, goal: GoalId) -> Option<f64> {
        self.fitness.as_ref().and_then(|f| f.get(goal.index()).copied())
    }

    /// Whether the fitness cache is current.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Non-domination rank from the last truncation (0 = first front).
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Crowding distance from the last truncation.
    pub fn crowding_distance(&self) -> f64 {
        self.distance
    }

    /// Number of statements in the chromosome.
    pub fn size(&self) -> usize {
        self.chromosome.size()
    }

    /// Whether the chromosome changed since its last evaluation.
    pub fn has_changed(&self) -> bool {
        self.chromosome.has_changed()
    }

    /// Worth keeping as offspring: changed and non-empty.
    pub fn is_viable(&self) -> bool {
        self.has_changed() && self.size() > 0
    }

    /// Mutates the chromosome, dropping the fitness cache if it changed.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        self.chromosome.mutate(rng);
        if self.chromosome.has_changed() {
            self.fitness = None;
        }
    }

    /// Deep copy under a new identity, keeping the fitness cache.
    pub(crate) fn offspring(&self, id: u64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    pub(crate) fn set_ranking(&mut self, rank: usize, distance: f64) {
        self.rank = rank;
        self.distance = distance;
    }

    /// Evaluates the chromosome against every goal and refreshes the cache.
    ///
    /// Clears the chromosome's `changed` flag on success.
    pub fn evaluate(&mut self, goals: &[Box<dyn FitnessFunction<C>>]) -> Result<()> {
        let mut values = Vec::with_capacity(goals.len());
        for (index, function) in goals.iter().enumerate() {
            let goal = GoalId(index);
            let value = function
                .evaluate(&self.chromosome)
                .map_err(|source| MosaError::Evaluation { goal, source })?;
            // Rejects NaN as well as negative values.
            if !(value >= 0.0) {
                return Err(MosaError::InvalidFitness { goal, value });
            }
            values.push(value);
        }
        self.fitness = Some(values);
        self.chromosome.set_changed(false);
        Ok(())
    }
}

/// Monotonic source of individual identities, owned by one run.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mosa::error::{ConstructionFailure, EvaluationError};
    use crate::mosa::types::FnFitness;

    /// Statement sequence used by engine tests across modules.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Seq {
        pub(crate) statements: Vec<u32>,
        pub(crate) changed: bool,
    }

    impl Seq {
        pub(crate) fn new(statements: Vec<u32>) -> Self {
            Self {
                statements,
                changed: true,
            }
        }
    }

    impl Chromosome for Seq {
        fn size(&self) -> usize {
            self.statements.len()
        }
        fn has_changed(&self) -> bool {
            self.changed
        }
        fn set_changed(&mut self, changed: bool) {
            self.changed = changed;
        }
        fn mutate<R: Rng>(&mut self, rng: &mut R) {
            // Append a random statement half of the time; otherwise no-op.
            if rng.random_bool(0.5) {
                self.statements.push(rng.random_range(0..100));
                self.changed = true;
            }
        }
        fn cross_over(
            &mut self,
            other: &Self,
            position: usize,
            other_position: usize,
        ) -> std::result::Result<(), ConstructionFailure> {
            self.statements.truncate(position);
            self.statements
                .extend_from_slice(&other.statements[other_position..]);
            self.changed = true;
            Ok(())
        }
    }

    fn length_goal() -> Box<dyn FitnessFunction<Seq>> {
        Box::new(FnFitness::new("length", |s: &Seq| Ok(s.statements.len() as f64)))
    }

    #[test]
    fn test_evaluate_caches_and_clears_changed() {
        let mut ind = Individual::new(0, Seq::new(vec![1, 2, 3]));
        assert!(!ind.is_evaluated());
        assert!(ind.has_changed());

        ind.evaluate(&[length_goal()]).unwrap();

        assert_eq!(ind.fitness(), Some(&[3.0][..]));
        assert_eq!(ind.goal_fitness(GoalId(0)), Some(3.0));
        assert!(!ind.has_changed());
    }

    #[test]
    fn test_structural_change_invalidates_fitness() {
        let mut ind = Individual::new(0, Seq::new(vec![1]));
        ind.evaluate(&[length_goal()]).unwrap();

        ind.chromosome_mut().statements.push(7);
        assert!(!ind.is_evaluated());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Frozen;

    impl Chromosome for Frozen {
        fn size(&self) -> usize {
            1
        }
        fn has_changed(&self) -> bool {
            false
        }
        fn set_changed(&mut self, _changed: bool) {}
        fn mutate<R: Rng>(&mut self, _rng: &mut R) {}
    }

    #[test]
    fn test_unchanged_mutation_keeps_fitness() {
        let goal: Box<dyn FitnessFunction<Frozen>> =
            Box::new(FnFitness::new("constant", |_: &Frozen| Ok(1.0)));
        let mut ind = Individual::new(0, Frozen);
        ind.evaluate(&[goal]).unwrap();

        let mut rng = rand::rng();
        ind.mutate(&mut rng);

        assert!(ind.is_evaluated());
        assert!(!ind.is_viable());
    }

    #[test]
    fn test_evaluation_failure_propagates() {
        let failing: Box<dyn FitnessFunction<Seq>> = Box::new(FnFitness::new("crash", |_: &Seq| {
            Err(EvaluationError::new("executor crashed"))
        }));
        let mut ind = Individual::new(0, Seq::new(vec![1]));

        let err = ind.evaluate(&[length_goal(), failing]).unwrap_err();
        assert!(matches!(err, MosaError::Evaluation { goal: GoalId(1), .. }));
        assert!(!ind.is_evaluated());
    }

    #[test]
    fn test_invalid_fitness_rejected() {
        let nan: Box<dyn FitnessFunction<Seq>> =
            Box::new(FnFitness::new("nan", |_: &Seq| Ok(f64::NAN)));
        let negative: Box<dyn FitnessFunction<Seq>> =
            Box::new(FnFitness::new("negative", |_: &Seq| Ok(-1.0)));
        let mut ind = Individual::new(0, Seq::new(vec![1]));

        assert!(matches!(
            ind.evaluate(&[nan]),
            Err(MosaError::InvalidFitness { .. })
        ));
        assert!(matches!(
            ind.evaluate(&[negative]),
            Err(MosaError::InvalidFitness { .. })
        ));
    }

    #[test]
    fn test_offspring_gets_new_identity() {
        let ind = Individual::new(4, Seq::new(vec![1, 2]));
        let child = ind.offspring(9);
        assert_eq!(child.id(), 9);
        assert_eq!(child.chromosome(), ind.chromosome());
    }

    #[test]
    fn test_id_sequence_is_monotonic() {
        let mut ids = IdSequence::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }
}
