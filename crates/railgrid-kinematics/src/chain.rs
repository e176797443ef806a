//! Serial chains of revolute and prismatic joints.
//!
//! [`KinematicChain`] flattens a [`ChainSpec`] into its actuated joints.
//! Fixed joints never survive construction: their origins are merged into
//! the following actuated joint, or into the tip offset.

use std::f64::consts::PI;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use railgrid_core::JointBounds;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building a chain out of a [`ChainSpec`].
#[derive(Debug, Error, PartialEq)]
pub enum ChainError {
    #[error("joint {0}: axis must be non-zero")]
    ZeroAxis(String),

    #[error("joint {joint}: invalid limits lower={lower}, upper={upper}")]
    InvalidLimits {
        joint: String,
        lower: f64,
        upper: f64,
    },

    #[error("joint {0}: prismatic joints need explicit limits")]
    MissingLimits(String),
}

// ---------------------------------------------------------------------------
// Spec (serde)
// ---------------------------------------------------------------------------

const fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

/// Joint type, named after the URDF joint types it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
}

impl JointKind {
    pub const fn is_actuated(self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// Static origin: translation plus roll-pitch-yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginSpec {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl OriginSpec {
    /// Rotation applies roll about X, then pitch about Y, then yaw about Z,
    /// all in the fixed parent frame.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.xyz;
        let [roll, pitch, yaw] = self.rpy;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

/// One joint of a chain description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    pub kind: JointKind,
    #[serde(default)]
    pub origin: OriginSpec,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
    /// `[lower, upper]` in rad or m. Revolute joints default to `[-pi, pi]`.
    #[serde(default)]
    pub limits: Option<[f64; 2]>,
}

/// Serializable description of a serial chain, base to tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub base_link: String,
    pub joints: Vec<JointSpec>,
    /// Offset after the last joint to the tip frame.
    #[serde(default)]
    pub tip: OriginSpec,
}

// ---------------------------------------------------------------------------
// KinematicChain
// ---------------------------------------------------------------------------

/// How an actuated joint moves its child frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Rotation about the axis by the joint value in radians.
    Rotate,
    /// Translation along the axis by the joint value in meters.
    Slide,
}

/// An actuated joint after fixed-joint folding.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    pub name: String,
    /// Parent frame to the joint frame at zero position.
    pub origin: Isometry3<f64>,
    /// Unit axis expressed in the joint frame.
    pub axis: UnitVector3<f64>,
    pub motion: Motion,
    pub bounds: JointBounds,
}

impl ChainJoint {
    pub fn is_prismatic(&self) -> bool {
        self.motion == Motion::Slide
    }

    /// Joint frame to child frame at `position`.
    fn displacement(&self, position: f64) -> Isometry3<f64> {
        match self.motion {
            Motion::Slide => Isometry3::from_parts(
                Translation3::from(self.axis.into_inner() * position),
                UnitQuaternion::identity(),
            ),
            Motion::Rotate => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, position),
            ),
        }
    }
}

/// Per-joint geometry at one configuration, in the chain's base frame.
#[derive(Debug, Clone)]
pub struct JointFrames {
    /// Position of each joint frame before its own motion is applied.
    pub origins: Vec<Vector3<f64>>,
    /// Each joint axis rotated into the base frame.
    pub axes: Vec<Vector3<f64>>,
    pub tip: Isometry3<f64>,
}

/// Actuated joints from a base link to a tip frame.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    base_link: String,
    joints: Vec<ChainJoint>,
    tip_offset: Isometry3<f64>,
}

impl KinematicChain {
    /// Build a chain from a [`ChainSpec`].
    ///
    /// # Errors
    ///
    /// Fails on zero axes, inverted or non-finite limits, and prismatic
    /// joints without limits.
    pub fn from_spec(spec: &ChainSpec) -> Result<Self, ChainError> {
        let mut joints = Vec::with_capacity(spec.joints.len());
        let mut pending = Isometry3::identity();

        for joint in &spec.joints {
            let origin = pending * joint.origin.to_isometry();
            if !joint.kind.is_actuated() {
                pending = origin;
                continue;
            }
            pending = Isometry3::identity();

            let [ax, ay, az] = joint.axis;
            let axis = UnitVector3::try_new(Vector3::new(ax, ay, az), 1e-12)
                .ok_or_else(|| ChainError::ZeroAxis(joint.name.clone()))?;
            let bounds = joint_bounds(joint)?;

            joints.push(ChainJoint {
                name: joint.name.clone(),
                origin,
                axis,
                motion: if joint.kind == JointKind::Prismatic {
                    Motion::Slide
                } else {
                    Motion::Rotate
                },
                bounds,
            });
        }

        Ok(Self {
            base_link: spec.base_link.clone(),
            joints,
            tip_offset: pending * spec.tip.to_isometry(),
        })
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Name of the link the chain is attached to.
    pub fn base_link(&self) -> &str {
        &self.base_link
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    /// Offset after the last joint.
    pub const fn tip_offset(&self) -> &Isometry3<f64> {
        &self.tip_offset
    }

    pub fn limits(&self) -> Vec<JointBounds> {
        self.joints.iter().map(|j| j.bounds).collect()
    }

    /// Tip pose in the base frame at configuration `q`.
    ///
    /// # Panics
    ///
    /// Panics if `q` does not have one value per joint.
    pub fn forward_kinematics(&self, q: &[f64]) -> Isometry3<f64> {
        assert_eq!(q.len(), self.dof(), "configuration length mismatch");
        let base_to_last = self
            .joints
            .iter()
            .zip(q)
            .fold(Isometry3::identity(), |frame, (joint, &position)| {
                frame * joint.origin * joint.displacement(position)
            });
        base_to_last * self.tip_offset
    }

    /// Joint origins, joint axes and tip pose at `q`, for building the
    /// geometric Jacobian.
    ///
    /// # Panics
    ///
    /// Panics if `q` does not have one value per joint.
    pub fn joint_frames(&self, q: &[f64]) -> JointFrames {
        assert_eq!(q.len(), self.dof(), "configuration length mismatch");

        let mut frame = Isometry3::identity();
        let mut frames = JointFrames {
            origins: Vec::with_capacity(self.dof()),
            axes: Vec::with_capacity(self.dof()),
            tip: Isometry3::identity(),
        };
        for (joint, &position) in self.joints.iter().zip(q) {
            frame *= joint.origin;
            frames.origins.push(frame.translation.vector);
            frames.axes.push(frame.rotation * joint.axis.into_inner());
            frame *= joint.displacement(position);
        }
        frames.tip = frame * self.tip_offset;
        frames
    }

    /// Pull every value of `q` back inside its joint bounds.
    pub fn clamp_joints(&self, q: &mut [f64]) {
        for (value, joint) in q.iter_mut().zip(&self.joints) {
            *value = value.clamp(joint.bounds.lower, joint.bounds.upper);
        }
    }

    /// Whether `q` has the chain's length and every value is within limits
    /// (widened by `tolerance`).
    pub fn within_limits(&self, q: &[f64], tolerance: f64) -> bool {
        q.len() == self.dof()
            && self
                .joints
                .iter()
                .zip(q)
                .all(|(joint, &value)| joint.bounds.contains(value, tolerance))
    }

    /// Upper bound on the distance from the base origin to the tip over all
    /// configurations within limits.
    pub fn reach_bound(&self) -> f64 {
        let links: f64 = self
            .joints
            .iter()
            .map(|joint| {
                let travel = match joint.motion {
                    Motion::Slide => joint.bounds.lower.abs().max(joint.bounds.upper.abs()),
                    Motion::Rotate => 0.0,
                };
                joint.origin.translation.vector.norm() + travel
            })
            .sum();
        links + self.tip_offset.translation.vector.norm()
    }
}

fn joint_bounds(joint: &JointSpec) -> Result<JointBounds, ChainError> {
    let [lower, upper] = match (joint.kind, joint.limits) {
        (JointKind::Continuous | JointKind::Fixed, _) | (JointKind::Revolute, None) => [-PI, PI],
        (JointKind::Prismatic, None) => return Err(ChainError::MissingLimits(joint.name.clone())),
        (_, Some(limits)) => limits,
    };
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Err(ChainError::InvalidLimits {
            joint: joint.name.clone(),
            lower,
            upper,
        });
    }
    Ok(JointBounds::new(lower, upper))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn revolute(name: &str, xyz: [f64; 3], axis: [f64; 3], limits: [f64; 2]) -> JointSpec {
        JointSpec {
            name: name.into(),
            kind: JointKind::Revolute,
            origin: OriginSpec { xyz, rpy: [0.0; 3] },
            axis,
            limits: Some(limits),
        }
    }

    /// Planar two-link arm in the XY plane: 0.3 m upper arm, 0.25 m forearm.
    fn planar_arm() -> ChainSpec {
        ChainSpec {
            base_link: "arm_base".into(),
            joints: vec![
                revolute("shoulder", [0.0, 0.0, 0.05], [0.0, 0.0, 1.0], [-2.6, 2.6]),
                revolute("elbow", [0.3, 0.0, 0.0], [0.0, 0.0, 1.0], [-2.6, 2.6]),
                JointSpec {
                    name: "tool_mount".into(),
                    kind: JointKind::Fixed,
                    origin: OriginSpec {
                        xyz: [0.25, 0.0, 0.0],
                        rpy: [0.0; 3],
                    },
                    axis: default_axis(),
                    limits: None,
                },
            ],
            tip: OriginSpec::default(),
        }
    }

    fn linear_rail() -> ChainSpec {
        ChainSpec {
            base_link: "rail_base".into(),
            joints: vec![JointSpec {
                name: "carriage".into(),
                kind: JointKind::Prismatic,
                origin: OriginSpec::default(),
                axis: [1.0, 0.0, 0.0],
                limits: Some([0.0, 2.0]),
            }],
            tip: OriginSpec {
                xyz: [0.0, 0.0, 0.4],
                rpy: [0.0; 3],
            },
        }
    }

    #[test]
    fn chain_from_planar_arm() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        assert_eq!(chain.dof(), 2);
        assert_eq!(chain.joint_names(), vec!["shoulder", "elbow"]);
        assert_eq!(chain.base_link(), "arm_base");
        // Trailing fixed joint folds into the tip offset
        assert_relative_eq!(chain.tip_offset().translation.x, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn fk_zero_position() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        let tip = chain.forward_kinematics(&[0.0, 0.0]);
        assert_relative_eq!(tip.translation.x, 0.55, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.z, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn fk_matches_planar_closed_form() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        let (q1, q2) = (0.4, -0.9);
        let tip = chain.forward_kinematics(&[q1, q2]);
        let x = 0.3 * q1.cos() + 0.25 * (q1 + q2).cos();
        let y = 0.3 * q1.sin() + 0.25 * (q1 + q2).sin();
        assert_relative_eq!(tip.translation.x, x, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.y, y, epsilon = 1e-12);
        assert_relative_eq!(tip.rotation.angle(), (q1 + q2).abs(), epsilon = 1e-12);
    }

    #[test]
    fn fk_prismatic_rail() {
        let chain = KinematicChain::from_spec(&linear_rail()).unwrap();
        let tip = chain.forward_kinematics(&[1.5]);
        assert_relative_eq!(tip.translation.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.z, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn joint_frames_tip_matches_fk() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        let q = [0.2, 0.7];
        let frames = chain.joint_frames(&q);
        assert_eq!(frames.origins.len(), 2);
        assert_eq!(frames.axes.len(), 2);
        assert_relative_eq!(frames.tip, chain.forward_kinematics(&q), epsilon = 1e-12);
    }

    #[test]
    fn clamp_and_limits() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        let mut q = [5.0, -5.0];
        chain.clamp_joints(&mut q);
        assert_relative_eq!(q[0], 2.6);
        assert_relative_eq!(q[1], -2.6);
        assert!(chain.within_limits(&q, 0.0));
        assert!(!chain.within_limits(&[2.7, 0.0], 0.0));
        assert!(!chain.within_limits(&[0.0], 0.0));
        assert_eq!(chain.limits()[0], JointBounds::new(-2.6, 2.6));
    }

    #[test]
    fn reach_bound_covers_stretched_arm() {
        let chain = KinematicChain::from_spec(&planar_arm()).unwrap();
        let stretched = chain.forward_kinematics(&[0.0, 0.0]).translation.vector.norm();
        assert!(chain.reach_bound() >= stretched - 1e-12);

        let rail = KinematicChain::from_spec(&linear_rail()).unwrap();
        assert_relative_eq!(rail.reach_bound(), 2.4, epsilon = 1e-12);
    }

    #[test]
    fn continuous_joint_defaults_to_full_turn() {
        let mut spec = planar_arm();
        spec.joints[0].kind = JointKind::Continuous;
        let chain = KinematicChain::from_spec(&spec).unwrap();
        assert_relative_eq!(chain.joints()[0].bounds.upper, PI);
        assert_eq!(chain.joints()[0].motion, Motion::Rotate);
    }

    #[test]
    fn zero_axis_is_rejected() {
        let mut spec = planar_arm();
        spec.joints[1].axis = [0.0; 3];
        assert_eq!(
            KinematicChain::from_spec(&spec).unwrap_err(),
            ChainError::ZeroAxis("elbow".into())
        );
    }

    #[test]
    fn prismatic_without_limits_is_rejected() {
        let mut spec = linear_rail();
        spec.joints[0].limits = None;
        assert!(matches!(
            KinematicChain::from_spec(&spec),
            Err(ChainError::MissingLimits(_))
        ));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let mut spec = linear_rail();
        spec.joints[0].limits = Some([1.0, -1.0]);
        assert!(matches!(
            KinematicChain::from_spec(&spec),
            Err(ChainError::InvalidLimits { .. })
        ));
    }

    #[test]
    fn origin_rpy_yaw() {
        let iso = OriginSpec {
            xyz: [1.0, 2.0, 3.0],
            rpy: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        }
        .to_isometry();
        let x_axis = iso.rotation * Vector3::x();
        assert_relative_eq!(x_axis, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(iso.translation.z, 3.0);
    }

    #[test]
    fn origin_rpy_roll_then_yaw() {
        let iso = OriginSpec {
            xyz: [0.0; 3],
            rpy: [std::f64::consts::FRAC_PI_2, 0.0, std::f64::consts::FRAC_PI_2],
        }
        .to_isometry();
        // Roll sends Y to Z, yaw leaves Z alone
        assert_relative_eq!(iso.rotation * Vector3::y(), Vector3::z(), epsilon = 1e-12);
        // Roll leaves X alone, yaw sends X to Y
        assert_relative_eq!(iso.rotation * Vector3::x(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn spec_from_toml() {
        let spec: ChainSpec = toml::from_str(
            r#"
            base_link = "rail_base"

            [[joints]]
            name = "carriage"
            kind = "prismatic"
            axis = [1.0, 0.0, 0.0]
            limits = [0.0, 3.0]

            [tip]
            xyz = [0.0, 0.0, 0.5]
            "#,
        )
        .unwrap();
        let chain = KinematicChain::from_spec(&spec).unwrap();
        assert_eq!(chain.dof(), 1);
        assert!(chain.joints()[0].is_prismatic());
    }
}
