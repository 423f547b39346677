//! Termination policies.
//!
//! The engine consults its [`StoppingCondition`] at the top of every
//! generation. A condition that fires ends the run with
//! [`Termination::BudgetExhausted`](super::Termination::BudgetExhausted);
//! covering every goal ends it independently of any condition.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Search state visible to stopping conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStatus {
    /// Generations completed.
    pub iteration: usize,

    /// Wall-clock time since the search started.
    pub elapsed: Duration,

    /// Number of covered goals.
    pub covered_goals: usize,

    /// Total number of goals.
    pub total_goals: usize,
}

/// Decides when the computation budget is spent.
pub trait StoppingCondition: Send + Sync {
    /// Returns `true` once the search must stop.
    fn is_fulfilled(&self, status: &SearchStatus) -> bool;
}

impl<S: StoppingCondition + ?Sized> StoppingCondition for Box<S> {
    fn is_fulfilled(&self, status: &SearchStatus) -> bool {
        (**self).is_fulfilled(status)
    }
}

impl<S: StoppingCondition + ?Sized> StoppingCondition for &S {
    fn is_fulfilled(&self, status: &SearchStatus) -> bool {
        (**self).is_fulfilled(status)
    }
}

/// Stops after a fixed number of generations. `MaxIterations(0)` stops
/// right after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxIterations(pub usize);

impl StoppingCondition for MaxIterations {
    fn is_fulfilled(&self, status: &SearchStatus) -> bool {
        status.iteration >= self.0
    }
}

/// Stops once the wall-clock budget is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxTime(pub Duration);

impl StoppingCondition for MaxTime {
    fn is_fulfilled(&self, status: &SearchStatus) -> bool {
        status.elapsed >= self.0
    }
}

/// Stops when an external flag is raised.
#[derive(Debug, Clone)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Watches `flag`.
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }
}

impl StoppingCondition for CancelFlag {
    fn is_fulfilled(&self, _status: &SearchStatus) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Never stops on its own; the run ends only when every goal is covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbounded;

impl StoppingCondition for Unbounded {
    fn is_fulfilled(&self, _status: &SearchStatus) -> bool {
        false
    }
}

/// Stops as soon as any of its conditions does.
///
/// ```
/// use std::time::Duration;
/// use u_mosa::mosa::{AnyOf, MaxIterations, MaxTime, SearchStatus, StoppingCondition};
///
/// let budget = AnyOf::new()
///     .or(MaxIterations(100))
///     .or(MaxTime(Duration::from_secs(60)));
///
/// let status = SearchStatus {
///     iteration: 100,
///     elapsed: Duration::from_secs(1),
///     covered_goals: 3,
///     total_goals: 10,
/// };
/// assert!(budget.is_fulfilled(&status));
/// ```
#[derive(Default)]
pub struct AnyOf {
    conditions: Vec<Box<dyn StoppingCondition>>,
}

impl AnyOf {
    /// An empty set, which never fires.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition.
    pub fn or<S: StoppingCondition + 'static>(mut self, condition: S) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether no condition has been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOf")
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

impl StoppingCondition for AnyOf {
    fn is_fulfilled(&self, status: &SearchStatus) -> bool {
        self.conditions.iter().any(|c| c.is_fulfilled(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(iteration: usize, elapsed_ms: u64) -> SearchStatus {
        SearchStatus {
            iteration,
            elapsed: Duration::from_millis(elapsed_ms),
            covered_goals: 0,
            total_goals: 4,
        }
    }

    #[test]
    fn test_max_iterations() {
        assert!(MaxIterations(0).is_fulfilled(&status(0, 0)));
        assert!(!MaxIterations(3).is_fulfilled(&status(2, 0)));
        assert!(MaxIterations(3).is_fulfilled(&status(3, 0)));
    }

    #[test]
    fn test_max_time() {
        let budget = MaxTime(Duration::from_millis(50));
        assert!(!budget.is_fulfilled(&status(10, 49)));
        assert!(budget.is_fulfilled(&status(10, 50)));
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let condition = CancelFlag::new(flag.clone());
        assert!(!condition.is_fulfilled(&status(0, 0)));
        flag.store(true, Ordering::Relaxed);
        assert!(condition.is_fulfilled(&status(0, 0)));
    }

    #[test]
    fn test_any_of() {
        let empty = AnyOf::new();
        assert!(empty.is_empty());
        assert!(!empty.is_fulfilled(&status(1_000, 1_000_000)));

        let budget = AnyOf::new()
            .or(MaxIterations(5))
            .or(MaxTime(Duration::from_secs(1)));
        assert_eq!(budget.len(), 2);
        assert!(!budget.is_fulfilled(&status(4, 10)));
        assert!(budget.is_fulfilled(&status(5, 10)));
        assert!(budget.is_fulfilled(&status(0, 1_000)));
    }

    #[test]
    fn test_unbounded() {
        assert!(!Unbounded.is_fulfilled(&status(usize::MAX, u64::MAX)));
    }
}
