//! Recombination policies.

use super::error::ConstructionFailure;
use super::types::Chromosome;
use rand::Rng;

/// Recombines two offspring in place.
///
/// On failure the engine discards both offspring, so implementations
/// need not restore them.
pub trait Crossover<C: Chromosome>: Send + Sync {
    /// Recombines `offspring1` and `offspring2`.
    fn cross_over<R: Rng>(
        &self,
        offspring1: &mut C,
        offspring2: &mut C,
        rng: &mut R,
    ) -> Result<(), ConstructionFailure>;
}

/// Single-point crossover at the same relative position in both parents.
///
/// Draws `p` in `[0, 1)` and splits each parent at `floor(p * size)`. The
/// first child keeps the head of parent 1 and the tail of parent 2, the
/// second child the reverse. Parents with fewer than two statements are
/// left as they are.
///
/// ```
/// use u_mosa::mosa::{Crossover, SinglePointRelativeCrossover};
///
/// let crossover = SinglePointRelativeCrossover::new(40);
/// assert_eq!(crossover.max_size(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinglePointRelativeCrossover {
    max_size: usize,
}

impl SinglePointRelativeCrossover {
    /// Children larger than `max_size` statements are rejected.
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// The size bound.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<C: Chromosome> Crossover<C> for SinglePointRelativeCrossover {
    fn cross_over<R: Rng>(
        &self,
        offspring1: &mut C,
        offspring2: &mut C,
        rng: &mut R,
    ) -> Result<(), ConstructionFailure> {
        let (size1, size2) = (offspring1.size(), offspring2.size());
        if size1 < 2 || size2 < 2 {
            return Ok(());
        }

        let split: f64 = rng.random_range(0.0..1.0);
        let pos1 = ((split * size1 as f64).floor() as usize).min(size1);
        let pos2 = ((split * size2 as f64).floor() as usize).min(size2);

        let child1 = pos1 + (size2 - pos2);
        let child2 = pos2 + (size1 - pos1);
        for size in [child1, child2] {
            if size > self.max_size {
                return Err(ConstructionFailure::SizeExceeded {
                    size,
                    max: self.max_size,
                });
            }
        }

        let head1 = offspring1.clone();
        offspring1.cross_over(offspring2, pos1, pos2)?;
        offspring2.cross_over(&head1, pos2, pos1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosa::individual::tests::Seq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_children_exchange_tails() {
        let crossover = SinglePointRelativeCrossover::new(100);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut a = Seq::new(vec![1, 1, 1, 1]);
            let mut b = Seq::new(vec![2, 2, 2, 2, 2, 2, 2, 2]);
            a.changed = false;
            b.changed = false;

            crossover.cross_over(&mut a, &mut b, &mut rng).unwrap();

            // Total material is preserved.
            assert_eq!(a.size() + b.size(), 12);
            assert!(a.changed && b.changed);
            // Heads stay in place.
            assert!(a.statements.iter().skip_while(|&&s| s == 1).all(|&s| s == 2));
            assert!(b.statements.iter().skip_while(|&&s| s == 2).all(|&s| s == 1));
        }
    }

    #[test]
    fn test_size_bound_rejects_large_children() {
        let crossover = SinglePointRelativeCrossover::new(3);
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = Seq::new(vec![1, 1]);
        let mut b = Seq::new(vec![2; 10]);

        let err = crossover.cross_over(&mut a, &mut b, &mut rng).unwrap_err();
        assert!(matches!(err, ConstructionFailure::SizeExceeded { max: 3, .. }));
    }

    #[test]
    fn test_short_parents_are_untouched() {
        let crossover = SinglePointRelativeCrossover::new(10);
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = Seq::new(vec![1]);
        let mut b = Seq::new(vec![2, 2, 2]);
        a.changed = false;

        crossover.cross_over(&mut a, &mut b, &mut rng).unwrap();
        assert_eq!(a.statements, vec![1]);
        assert!(!a.changed);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Opaque(usize);

    impl Chromosome for Opaque {
        fn size(&self) -> usize {
            self.0
        }
        fn has_changed(&self) -> bool {
            true
        }
        fn set_changed(&mut self, _changed: bool) {}
        fn mutate<R: Rng>(&mut self, _rng: &mut R) {}
    }

    #[test]
    fn test_unsupported_chromosome_fails_construction() {
        let crossover = SinglePointRelativeCrossover::new(10);
        let mut rng = StdRng::seed_from_u64(7);
        let (mut a, mut b) = (Opaque(3), Opaque(3));

        assert_eq!(
            crossover.cross_over(&mut a, &mut b, &mut rng),
            Err(ConstructionFailure::Unsupported)
        );
    }
}
