//! Per-point IK resolution and full-solution assembly.

use railgrid_core::{Pose, RailKinematics, RobotKinematics, SolutionValidator};
use tracing::trace;

use crate::stats::{SearchStats, SkipReason};
use crate::strategy::SolutionStrategy;

/// Resolves arm IK at one fully assigned rail point and feeds every valid
/// full solution (rail point followed by arm branch) to a strategy.
pub struct PointResolver<'a> {
    pub rail: &'a dyn RailKinematics,
    pub robot: &'a dyn RobotKinematics,
    pub validator: &'a dyn SolutionValidator,
    pub robot_reach: f64,
    pub ik_seed: &'a [f64],
}

impl PointResolver<'_> {
    /// Resolve `target` (rail base frame) at `rail_point`.
    ///
    /// `scratch` is reused between calls to assemble full solutions.
    pub fn resolve<S: SolutionStrategy>(
        &self,
        target: &Pose,
        rail_point: &[f64],
        strategy: &mut S,
        stats: &mut SearchStats,
        scratch: &mut Vec<f64>,
    ) {
        stats.points_visited += 1;

        stats.rail_fk_calls += 1;
        let Some(rail_tip) = self.rail.forward(rail_point) else {
            skip(stats, SkipReason::Unreachable, rail_point);
            return;
        };

        let robot_target = rail_tip.inverse() * target;
        if robot_target.translation.vector.norm() > self.robot_reach {
            skip(stats, SkipReason::ReachExceeded, rail_point);
            return;
        }

        stats.ik_calls += 1;
        let robot_dof = self.robot.dof();
        let branches = self
            .robot
            .inverse(&robot_target, self.ik_seed)
            .unwrap_or_default();
        if robot_dof == 0 || branches.len() < robot_dof {
            skip(stats, SkipReason::IkFailed, rail_point);
            return;
        }

        for branch in branches.chunks_exact(robot_dof) {
            stats.branches += 1;
            scratch.clear();
            scratch.extend_from_slice(rail_point);
            scratch.extend_from_slice(branch);

            if !self.validator.is_valid(scratch) {
                skip(stats, SkipReason::InvalidCandidate, rail_point);
                continue;
            }
            strategy.offer(scratch, stats);
        }
    }
}

fn skip(stats: &mut SearchStats, reason: SkipReason, rail_point: &[f64]) {
    stats.record_skip(reason);
    trace!(
        "railgrid-sampler: rail point {rail_point:?} skipped ({})",
        reason.as_str()
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
