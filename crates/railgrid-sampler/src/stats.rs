//! Per-pass counters and local skip reasons.

/// Why a rail point or an assembled solution was dropped.
///
/// Skips are recovered locally and never surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rail forward kinematics reported the point unreachable.
    Unreachable,
    /// The robot-frame target lies beyond the configured reach.
    ReachExceeded,
    /// Inverse kinematics failed or returned no branch.
    IkFailed,
    /// The injected validity rule rejected the solution.
    InvalidCandidate,
    /// Collision check failed in collect-all mode.
    CollisionRejected,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::ReachExceeded => "reach_exceeded",
            Self::IkFailed => "ik_failed",
            Self::InvalidCandidate => "invalid_candidate",
            Self::CollisionRejected => "collision_rejected",
        }
    }
}

/// Counters for one search pass (or the sum of several).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Rail points visited (grid points times tool-pose candidates).
    pub points_visited: usize,
    /// Rail forward-kinematics calls.
    pub rail_fk_calls: usize,
    /// Inverse-kinematics calls.
    pub ik_calls: usize,
    /// IK branches assembled into full solutions.
    pub branches: usize,
    /// Solutions appended (collect-all) or promoted to best (best-only).
    pub accepted: usize,
    pub unreachable: usize,
    pub reach_exceeded: usize,
    pub ik_failed: usize,
    pub invalid: usize,
    pub collision_rejected: usize,
}

impl SearchStats {
    /// Count one skip.
    pub fn record_skip(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::Unreachable => &mut self.unreachable,
            SkipReason::ReachExceeded => &mut self.reach_exceeded,
            SkipReason::IkFailed => &mut self.ik_failed,
            SkipReason::InvalidCandidate => &mut self.invalid,
            SkipReason::CollisionRejected => &mut self.collision_rejected,
        };
        *counter += 1;
    }

    /// Total skips of every kind.
    pub const fn skipped(&self) -> usize {
        self.unreachable + self.reach_exceeded + self.ik_failed + self.invalid + self.collision_rejected
    }

    /// Field-wise sum.
    #[must_use]
    pub const fn merged(self, other: Self) -> Self {
        Self {
            points_visited: self.points_visited + other.points_visited,
            rail_fk_calls: self.rail_fk_calls + other.rail_fk_calls,
            ik_calls: self.ik_calls + other.ik_calls,
            branches: self.branches + other.branches,
            accepted: self.accepted + other.accepted,
            unreachable: self.unreachable + other.unreachable,
            reach_exceeded: self.reach_exceeded + other.reach_exceeded,
            ik_failed: self.ik_failed + other.ik_failed,
            invalid: self.invalid + other.invalid,
            collision_rejected: self.collision_rejected + other.collision_rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
