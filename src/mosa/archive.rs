//! Per-goal archive of the best covering candidates.
//!
//! The archive is the only state that survives population turnover: once
//! a goal is covered its record stays covered for the rest of the run.
//! Among covering candidates the smaller one wins; on equal size the
//! existing record is kept, which makes repeated updates idempotent.

use super::error::{MosaError, Result};
use super::individual::Individual;
use super::types::{Chromosome, GoalId};
use std::collections::BTreeSet;

/// Best-known covering individual per goal.
#[derive(Debug, Clone)]
pub struct Archive<C> {
    records: Vec<Option<Individual<C>>>,
    covered: BTreeSet<GoalId>,
    uncovered: Vec<GoalId>,
}

impl<C: Chromosome> Archive<C> {
    /// Creates an empty archive for `goal_count` goals.
    pub fn new(goal_count: usize) -> Self {
        Self {
            records: vec![None; goal_count],
            covered: BTreeSet::new(),
            uncovered: (0..goal_count).map(GoalId).collect(),
        }
    }

    /// Number of goals tracked.
    pub fn goal_count(&self) -> usize {
        self.records.len()
    }

    /// Merges evaluated candidates into the archive.
    ///
    /// For every goal a candidate covers, it replaces the current record
    /// if there is none or if it is strictly smaller. Returns the number
    /// of records that changed.
    ///
    /// # Errors
    ///
    /// [`MosaError::NotEvaluated`] if a candidate's fitness is stale and
    /// [`MosaError::GoalCountMismatch`] if it was evaluated against a
    /// different goal list. The archive is left untouched in both cases.
    pub fn update<'a, I>(&mut self, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Individual<C>>,
        C: 'a,
    {
        let goal_count = self.goal_count();
        let mut checked = Vec::new();
        for candidate in candidates {
            let fitness = candidate
                .fitness()
                .ok_or(MosaError::NotEvaluated(candidate.id()))?;
            if fitness.len() != goal_count {
                return Err(MosaError::GoalCountMismatch {
                    expected: goal_count,
                    actual: fitness.len(),
                });
            }
            checked.push((candidate, fitness));
        }

        let mut replaced = 0;
        for (candidate, fitness) in checked {
            for (index, &value) in fitness.iter().enumerate() {
                if value != 0.0 {
                    continue;
                }
                let slot = &mut self.records[index];
                let better = match slot {
                    None => true,
                    Some(best) => candidate.size() < best.size(),
                };
                if better {
                    *slot = Some(candidate.clone());
                    self.covered.insert(GoalId(index));
                    replaced += 1;
                }
            }
        }

        if replaced > 0 {
            let covered = &self.covered;
            self.uncovered.retain(|goal| !covered.contains(goal));
        }
        Ok(replaced)
    }

    /// Goals with an archived covering candidate.
    pub fn covered_goals(&self) -> &BTreeSet<GoalId> {
        &self.covered
    }

    /// Goals still taking part in dominance comparisons, in id order.
    pub fn uncovered_goals(&self) -> &[GoalId] {
        &self.uncovered
    }

    /// Whether `goal` is covered.
    pub fn is_covered(&self, goal: GoalId) -> bool {
        self.covered.contains(&goal)
    }

    /// Whether every goal is covered. Vacuously true without goals.
    pub fn all_covered(&self) -> bool {
        self.uncovered.is_empty()
    }

    /// Fraction of goals covered, `1.0` without goals.
    pub fn coverage(&self) -> f64 {
        if self.records.is_empty() {
            1.0
        } else {
            self.covered.len() as f64 / self.records.len() as f64
        }
    }

    /// The archived individual for `goal`.
    pub fn record(&self, goal: GoalId) -> Option<&Individual<C>> {
        self.records.get(goal.index()).and_then(Option::as_ref)
    }

    /// Archived individuals without duplicates, in goal order.
    ///
    /// Records with equal chromosomes appear once, as the first of them
    /// in goal order.
    pub fn solutions(&self) -> Vec<&Individual<C>> {
        let mut unique: Vec<&Individual<C>> = Vec::new();
        for ind in self.records.iter().flatten() {
            if !unique.iter().any(|kept| kept.chromosome() == ind.chromosome()) {
                unique.push(ind);
            }
        }
        unique
    }
}
