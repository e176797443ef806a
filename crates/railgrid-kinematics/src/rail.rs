//! Rail forward kinematics backed by a [`KinematicChain`].

use railgrid_core::{JointBounds, Pose, RailKinematics};
use tracing::trace;

use crate::chain::KinematicChain;

/// Slack allowed when checking rail points against the chain limits, so
/// grid endpoints computed in floating point are not rejected.
const LIMIT_TOLERANCE: f64 = 1e-9;

/// External positioning axis described as a serial chain.
#[derive(Debug, Clone)]
pub struct ChainRail {
    chain: KinematicChain,
    limits: Vec<JointBounds>,
}

impl ChainRail {
    pub fn new(chain: KinematicChain) -> Self {
        let limits = chain.limits();
        Self { chain, limits }
    }

    pub const fn chain(&self) -> &KinematicChain {
        &self.chain
    }
}

impl RailKinematics for ChainRail {
    fn dof(&self) -> usize {
        self.chain.dof()
    }

    fn limits(&self) -> &[JointBounds] {
        &self.limits
    }

    fn base_link(&self) -> &str {
        self.chain.base_link()
    }

    fn forward(&self, q: &[f64]) -> Option<Pose> {
        if !self.chain.within_limits(q, LIMIT_TOLERANCE) {
            trace!("railgrid-kinematics: rail point {q:?} outside limits");
            return None;
        }
        Some(self.chain.forward_kinematics(q))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
