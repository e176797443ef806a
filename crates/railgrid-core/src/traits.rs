//! Collaborator seams of the railed sampler.
//!
//! The sampler never owns a kinematics or collision engine. It calls these
//! traits and treats every answer as read-only. Implementations must be
//! `Send + Sync` so one sampler can be shared across threads; each sampling
//! call keeps its working state local.

use crate::types::{JointBounds, Pose};

// ---------------------------------------------------------------------------
// RailKinematics
// ---------------------------------------------------------------------------

/// Forward kinematics of the external positioning axis.
pub trait RailKinematics: Send + Sync {
    /// Number of rail degrees of freedom.
    fn dof(&self) -> usize;

    /// Per-DOF position limits, `limits().len() == dof()`.
    fn limits(&self) -> &[JointBounds];

    /// Name of the rail's base link in the environment state.
    fn base_link(&self) -> &str;

    /// Tip transform in the rail base frame, or `None` if `q` is unreachable.
    fn forward(&self, q: &[f64]) -> Option<Pose>;
}

// ---------------------------------------------------------------------------
// RobotKinematics
// ---------------------------------------------------------------------------

/// Inverse kinematics of the robot arm carried by the rail.
pub trait RobotKinematics: Send + Sync {
    /// Number of arm degrees of freedom.
    fn dof(&self) -> usize;

    /// Solve for `target`, expressed in the arm's base frame.
    ///
    /// Returns zero or more branches of `dof()` scalars packed back to back,
    /// or `None` on failure (treated the same as zero branches).
    fn inverse(&self, target: &Pose, seed: &[f64]) -> Option<Vec<f64>>;
}

// ---------------------------------------------------------------------------
// CollisionCheck
// ---------------------------------------------------------------------------

/// Collision queries on full (rail + arm) joint vectors.
pub trait CollisionCheck: Send + Sync {
    /// `true` if the configuration is collision-free.
    fn validate(&self, q: &[f64]) -> bool;

    /// Signed clearance of the configuration.
    ///
    /// Larger means more separation from obstacles; negative means
    /// penetration. The fallback search keeps the largest value it sees.
    fn distance(&self, q: &[f64]) -> f64;
}

// ---------------------------------------------------------------------------
// SolutionValidator
// ---------------------------------------------------------------------------

/// Acceptance rule applied to every assembled full joint vector.
pub trait SolutionValidator: Send + Sync {
    fn is_valid(&self, q: &[f64]) -> bool;
}

impl<F> SolutionValidator for F
where
    F: Fn(&[f64]) -> bool + Send + Sync,
{
    fn is_valid(&self, q: &[f64]) -> bool {
        self(q)
    }
}

// ---------------------------------------------------------------------------
// ToolPoseSampler
// ---------------------------------------------------------------------------

/// Produces the ordered alternatives of a nominal tool pose
/// (e.g. the re-orientations of a rotationally symmetric tool).
pub trait ToolPoseSampler: Send + Sync {
    fn sample(&self, nominal: &Pose) -> Vec<Pose>;
}

impl<F> ToolPoseSampler for F
where
    F: Fn(&Pose) -> Vec<Pose> + Send + Sync,
{
    fn sample(&self, nominal: &Pose) -> Vec<Pose> {
        self(nominal)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
