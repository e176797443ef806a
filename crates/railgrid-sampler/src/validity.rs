//! Validity rules for assembled full joint solutions.

use railgrid_core::{ConfigError, JointBounds, RailKinematics, SolutionValidator};

/// Accepts every solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SolutionValidator for AcceptAll {
    fn is_valid(&self, _q: &[f64]) -> bool {
        true
    }
}

/// Accepts a solution when every joint lies within its bounds.
#[derive(Debug, Clone)]
pub struct JointLimitValidator {
    bounds: Vec<JointBounds>,
    tolerance: f64,
}

impl JointLimitValidator {
    pub const fn new(bounds: Vec<JointBounds>, tolerance: f64) -> Self {
        Self { bounds, tolerance }
    }

    /// Rail limits followed by arm limits, matching the layout of a full
    /// solution.
    ///
    /// # Errors
    ///
    /// Fails if the rail reports a limit list whose length differs from its
    /// dof.
    pub fn from_parts(
        rail: &dyn RailKinematics,
        robot_limits: &[JointBounds],
        tolerance: f64,
    ) -> Result<Self, ConfigError> {
        if rail.limits().len() != rail.dof() {
            return Err(ConfigError::DimensionMismatch {
                what: "rail limits",
                expected: rail.dof(),
                got: rail.limits().len(),
            });
        }
        let bounds = rail.limits().iter().chain(robot_limits).copied().collect();
        Ok(Self::new(bounds, tolerance))
    }

    pub fn bounds(&self) -> &[JointBounds] {
        &self.bounds
    }
}

impl SolutionValidator for JointLimitValidator {
    fn is_valid(&self, q: &[f64]) -> bool {
        q.len() == self.bounds.len()
            && q.iter()
                .zip(&self.bounds)
                .all(|(&v, b)| b.contains(v, self.tolerance))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use railgrid_core::Pose;

    struct TwoAxisRail {
        limits: [JointBounds; 2],
    }

    impl RailKinematics for TwoAxisRail {
        fn dof(&self) -> usize {
            2
        }

        fn limits(&self) -> &[JointBounds] {
            &self.limits
        }

        fn base_link(&self) -> &str {
            "gantry"
        }

        fn forward(&self, q: &[f64]) -> Option<Pose> {
            Some(Pose::translation(q[0], q[1], 0.0))
        }
    }

    #[test]
    fn accept_all() {
        assert!(AcceptAll.is_valid(&[]));
        assert!(AcceptAll.is_valid(&[1e9, -1e9]));
    }

    #[test]
    fn joint_limits_with_tolerance() {
        let v = JointLimitValidator::new(vec![JointBounds::new(-1.0, 1.0); 2], 1e-6);
        assert!(v.is_valid(&[0.0, 1.0]));
        assert!(v.is_valid(&[-1.0 - 5e-7, 0.0]));
        assert!(!v.is_valid(&[0.0, 1.01]));
    }

    #[test]
    fn joint_limits_reject_wrong_length() {
        let v = JointLimitValidator::new(vec![JointBounds::new(-1.0, 1.0); 2], 0.0);
        assert!(!v.is_valid(&[0.0]));
        assert!(!v.is_valid(&[0.0, 0.0, 0.0]));
    }

    #[test]
    fn from_parts_orders_rail_first() {
        let rail = TwoAxisRail {
            limits: [JointBounds::new(0.0, 2.0), JointBounds::new(0.0, 3.0)],
        };
        let arm = [JointBounds::new(-0.5, 0.5)];
        let v = JointLimitValidator::from_parts(&rail, &arm, 0.0).unwrap();
        assert_eq!(v.bounds().len(), 3);
        assert!(v.is_valid(&[1.5, 2.5, 0.0]));
        assert!(!v.is_valid(&[0.0, 0.0, 1.0]));
    }
}
