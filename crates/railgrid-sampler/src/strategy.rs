//! Accumulation strategies shared by one search driver.
//!
//! [`CollectAll`] appends every collision-free solution. [`BestOnly`] holds
//! at most one solution and replaces it only when a larger clearance shows
//! up. The driver and the per-point resolver never branch on the mode; they
//! hand each valid solution to the strategy.

use railgrid_core::{CollisionCheck, SolutionSet, TieBreak};

use crate::stats::{SearchStats, SkipReason};

/// Receives every valid full joint solution produced by a search pass.
pub trait SolutionStrategy {
    /// Consider one solution of exactly `dof` scalars.
    fn offer(&mut self, solution: &[f64], stats: &mut SearchStats);

    /// Solutions accumulated so far.
    fn solutions(&self) -> &SolutionSet;

    fn into_solutions(self) -> SolutionSet;
}

// ---------------------------------------------------------------------------
// CollectAll
// ---------------------------------------------------------------------------

/// Keeps every solution the collision capability accepts, or every
/// solution when there is no collision capability.
pub struct CollectAll<'a> {
    collision: Option<&'a dyn CollisionCheck>,
    set: SolutionSet,
}

impl<'a> CollectAll<'a> {
    pub const fn new(dof: usize, collision: Option<&'a dyn CollisionCheck>) -> Self {
        Self {
            collision,
            set: SolutionSet::new(dof),
        }
    }
}

impl SolutionStrategy for CollectAll<'_> {
    fn offer(&mut self, solution: &[f64], stats: &mut SearchStats) {
        let collision_free = self.collision.is_none_or(|c| c.validate(solution));
        if collision_free {
            self.set.push(solution);
            stats.accepted += 1;
        } else {
            stats.record_skip(SkipReason::CollisionRejected);
        }
    }

    fn solutions(&self) -> &SolutionSet {
        &self.set
    }

    fn into_solutions(self) -> SolutionSet {
        self.set
    }
}

// ---------------------------------------------------------------------------
// BestOnly
// ---------------------------------------------------------------------------

/// Keeps the single solution with the largest clearance seen so far.
pub struct BestOnly<'a> {
    collision: &'a dyn CollisionCheck,
    tie_break: TieBreak,
    best_distance: f64,
    set: SolutionSet,
}

impl<'a> BestOnly<'a> {
    pub const fn new(dof: usize, collision: &'a dyn CollisionCheck, tie_break: TieBreak) -> Self {
        Self {
            collision,
            tie_break,
            best_distance: f64::NEG_INFINITY,
            set: SolutionSet::new(dof),
        }
    }

    /// Clearance of the retained solution, `None` while nothing is retained.
    pub fn best_distance(&self) -> Option<f64> {
        (!self.set.is_empty()).then_some(self.best_distance)
    }

    fn improves(&self, distance: f64) -> bool {
        if self.set.is_empty() {
            return !distance.is_nan();
        }
        match self.tie_break {
            TieBreak::FirstFound => distance > self.best_distance,
            TieBreak::LastFound => distance >= self.best_distance,
        }
    }
}

impl SolutionStrategy for BestOnly<'_> {
    fn offer(&mut self, solution: &[f64], stats: &mut SearchStats) {
        let distance = self.collision.distance(solution);
        if self.improves(distance) {
            self.best_distance = distance;
            self.set.replace_with(solution);
            stats.accepted += 1;
        }
    }

    fn solutions(&self) -> &SolutionSet {
        &self.set
    }

    fn into_solutions(self) -> SolutionSet {
        self.set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Clearance is the first joint value; collision-free when positive.
    struct FirstJointClearance;

    impl CollisionCheck for FirstJointClearance {
        fn validate(&self, q: &[f64]) -> bool {
            q[0] > 0.0
        }

        fn distance(&self, q: &[f64]) -> f64 {
            q[0]
        }
    }

    #[test]
    fn collect_all_without_collision_keeps_everything() {
        let mut stats = SearchStats::default();
        let mut strategy = CollectAll::new(2, None);
        strategy.offer(&[-1.0, 0.0], &mut stats);
        strategy.offer(&[1.0, 0.0], &mut stats);
        assert_eq!(strategy.solutions().len(), 2);
        assert_eq!(stats.accepted, 2);
    }

    #[test]
    fn collect_all_filters_collisions() {
        let mut stats = SearchStats::default();
        let mut strategy = CollectAll::new(2, Some(&FirstJointClearance));
        strategy.offer(&[-1.0, 0.0], &mut stats);
        strategy.offer(&[1.0, 0.0], &mut stats);
        strategy.offer(&[2.0, 0.0], &mut stats);
        let set = strategy.into_solutions();
        assert_eq!(set.as_slice(), &[1.0, 0.0, 2.0, 0.0]);
        assert_eq!(stats.collision_rejected, 1);
    }

    #[test]
    fn best_only_accepts_negative_clearance() {
        let mut stats = SearchStats::default();
        let mut strategy = BestOnly::new(1, &FirstJointClearance, TieBreak::FirstFound);
        assert_eq!(strategy.best_distance(), None);
        strategy.offer(&[-0.1], &mut stats);
        strategy.offer(&[-0.05], &mut stats);
        strategy.offer(&[-0.2], &mut stats);
        assert_eq!(strategy.solutions().as_slice(), &[-0.05]);
        assert_eq!(strategy.best_distance(), Some(-0.05));
        assert_eq!(stats.accepted, 2);
    }

    #[test]
    fn best_only_holds_at_most_one() {
        let mut stats = SearchStats::default();
        let mut strategy = BestOnly::new(1, &FirstJointClearance, TieBreak::FirstFound);
        for v in [0.1, 0.3, 0.2, 0.5, 0.4] {
            strategy.offer(&[v], &mut stats);
            assert_eq!(strategy.solutions().len(), 1);
        }
        assert_eq!(strategy.solutions().as_slice(), &[0.5]);
    }

    /// Clearance ignores the second joint so two solutions can tie.
    #[test]
    fn tie_break_first_found_keeps_earliest() {
        let mut stats = SearchStats::default();
        let mut strategy = BestOnly::new(2, &FirstJointClearance, TieBreak::FirstFound);
        strategy.offer(&[0.3, 1.0], &mut stats);
        strategy.offer(&[0.3, 2.0], &mut stats);
        assert_eq!(strategy.solutions().as_slice(), &[0.3, 1.0]);
    }

    #[test]
    fn tie_break_last_found_keeps_latest() {
        let mut stats = SearchStats::default();
        let mut strategy = BestOnly::new(2, &FirstJointClearance, TieBreak::LastFound);
        strategy.offer(&[0.3, 1.0], &mut stats);
        strategy.offer(&[0.3, 2.0], &mut stats);
        strategy.offer(&[0.2, 3.0], &mut stats);
        assert_eq!(strategy.solutions().as_slice(), &[0.3, 2.0]);
    }

    #[test]
    fn best_only_ignores_nan_clearance() {
        let mut stats = SearchStats::default();
        let mut strategy = BestOnly::new(1, &FirstJointClearance, TieBreak::LastFound);
        strategy.offer(&[f64::NAN], &mut stats);
        assert!(strategy.solutions().is_empty());
        strategy.offer(&[-1.0], &mut stats);
        strategy.offer(&[f64::NAN], &mut stats);
        assert_eq!(strategy.solutions().as_slice(), &[-1.0]);
    }
}
