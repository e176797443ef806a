//! Tool-pose samplers.

use std::f64::consts::TAU;

use nalgebra::{UnitQuaternion, Vector3};
use railgrid_core::{ConfigError, Pose, ToolPoseSampler};

/// Most candidates [`AxisSymmetricToolPose`] may produce per nominal pose.
pub const MAX_TOOL_POSE_STEPS: usize = 100_000;

/// Yields only the nominal pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedToolPose;

impl ToolPoseSampler for FixedToolPose {
    fn sample(&self, nominal: &Pose) -> Vec<Pose> {
        vec![*nominal]
    }
}

/// Rotations of the nominal pose about its own Z axis, for tools that are
/// symmetric around their approach direction.
///
/// One full turn is split into equal steps no larger than the resolution;
/// the first candidate is the nominal pose.
#[derive(Debug, Clone, Copy)]
pub struct AxisSymmetricToolPose {
    steps: usize,
}

impl AxisSymmetricToolPose {
    /// # Errors
    ///
    /// Fails if `resolution` is not strictly positive and finite, or splits
    /// a full turn into more than [`MAX_TOOL_POSE_STEPS`] candidates.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(resolution: f64) -> Result<Self, ConfigError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "tool_pose_resolution".into(),
                message: format!("must be positive and finite, got {resolution}"),
            });
        }
        let steps = (TAU / resolution).ceil();
        if !steps.is_finite() || steps > MAX_TOOL_POSE_STEPS as f64 {
            return Err(ConfigError::InvalidValue {
                field: "tool_pose_resolution".into(),
                message: format!(
                    "{resolution} rad needs more than {MAX_TOOL_POSE_STEPS} candidates per turn"
                ),
            });
        }
        Ok(Self {
            steps: (steps as usize).max(1),
        })
    }

    /// Number of candidates produced per nominal pose.
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Angular step between consecutive candidates.
    #[allow(clippy::cast_precision_loss)]
    pub fn angle_step(&self) -> f64 {
        TAU / self.steps as f64
    }
}

impl ToolPoseSampler for AxisSymmetricToolPose {
    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, nominal: &Pose) -> Vec<Pose> {
        let step = self.angle_step();
        (0..self.steps)
            .map(|i| {
                let spin = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), step * i as f64);
                nominal * spin
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
