use nalgebra::{Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Pose;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
const fn default_robot_reach() -> f64 {
    1.0
}

// ---------------------------------------------------------------------------
// PoseConfig
// ---------------------------------------------------------------------------

/// Serializable rigid transform: position `[x, y, z]` plus quaternion
/// `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 4],
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: default_orientation(),
        }
    }
}

impl PoseConfig {
    /// Convert to a [`Pose`], normalizing the quaternion.
    pub fn to_pose(&self) -> Result<Pose, ConfigError> {
        let [x, y, z, w] = self.orientation;
        let q = Quaternion::new(w, x, y, z);
        if q.norm() <= f64::EPSILON || !q.norm().is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "orientation".into(),
                message: "quaternion must be non-zero and finite".into(),
            });
        }
        let [px, py, pz] = self.position;
        Ok(Pose::from_parts(
            Translation3::new(px, py, pz),
            UnitQuaternion::from_quaternion(q),
        ))
    }
}

impl From<&Pose> for PoseConfig {
    fn from(pose: &Pose) -> Self {
        let t = pose.translation.vector;
        let q = pose.rotation.quaternion();
        Self {
            position: [t.x, t.y, t.z],
            orientation: [q.i, q.j, q.k, q.w],
        }
    }
}

// ---------------------------------------------------------------------------
// TieBreak
// ---------------------------------------------------------------------------

/// Which configuration the fallback search keeps when two clearances tie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the earliest configuration; replace only on strictly larger clearance.
    #[default]
    FirstFound,
    /// Keep the latest configuration; replace on equal or larger clearance.
    LastFound,
}

// ---------------------------------------------------------------------------
// SamplerConfig
// ---------------------------------------------------------------------------

/// Scalar configuration of a railed sampler.
///
/// Collaborators (kinematics, collision, validity rule, tool-pose sampler)
/// are injected in code; everything here can come from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Rail sample step per rail DOF (m or rad). Must be > 0.
    pub rail_resolution: Vec<f64>,

    /// Maximum distance from the arm base its tool can reach (m).
    #[serde(default = "default_robot_reach")]
    pub robot_reach: f64,

    /// Fall back to the best-clearance configuration when nothing is
    /// collision-free.
    #[serde(default)]
    pub allow_collision: bool,

    /// Transform from the arm's kinematic tip to the tool working point.
    #[serde(default)]
    pub tcp_offset: PoseConfig,

    /// IK seed of arm-DOF length. `None` means the zero vector.
    #[serde(default)]
    pub ik_seed: Option<Vec<f64>>,

    /// Tie policy for the fallback search.
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl SamplerConfig {
    /// Config with the given resolution and defaults elsewhere.
    pub fn new(rail_resolution: Vec<f64>) -> Self {
        Self {
            rail_resolution,
            robot_reach: default_robot_reach(),
            allow_collision: false,
            tcp_offset: PoseConfig::default(),
            ik_seed: None,
            tie_break: TieBreak::default(),
        }
    }

    /// Validate values that do not depend on the collaborators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (dof, &value) in self.rail_resolution.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidResolution { dof, value });
            }
        }
        if !(self.robot_reach.is_finite() && self.robot_reach > 0.0) {
            return Err(ConfigError::InvalidReach(self.robot_reach));
        }
        if let Some(seed) = &self.ik_seed {
            if seed.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: "ik_seed".into(),
                    message: "seed values must be finite".into(),
                });
            }
        }
        self.tcp_offset.to_pose()?;
        Ok(())
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ---- defaults ----

    #[test]
    fn sampler_config_defaults() {
        let cfg = SamplerConfig::new(vec![0.1]);
        assert_relative_eq!(cfg.robot_reach, 1.0);
        assert!(!cfg.allow_collision);
        assert_eq!(cfg.tcp_offset, PoseConfig::default());
        assert!(cfg.ik_seed.is_none());
        assert_eq!(cfg.tie_break, TieBreak::FirstFound);
        assert!(cfg.validate().is_ok());
    }

    // ---- validate ----

    #[test]
    fn validate_rejects_zero_resolution() {
        let cfg = SamplerConfig::new(vec![0.1, 0.0]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidResolution { dof: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_resolution() {
        let cfg = SamplerConfig::new(vec![-0.5]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidResolution { dof: 0, .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_resolution() {
        let cfg = SamplerConfig::new(vec![f64::NAN]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_reach() {
        let mut cfg = SamplerConfig::new(vec![0.1]);
        cfg.robot_reach = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidReach(_))));
    }

    #[test]
    fn validate_rejects_zero_quaternion() {
        let mut cfg = SamplerConfig::new(vec![0.1]);
        cfg.tcp_offset.orientation = [0.0; 4];
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    // ---- TOML ----

    #[test]
    fn from_toml_full() {
        let cfg = SamplerConfig::from_toml_str(
            r#"
            rail_resolution = [0.25, 0.5]
            robot_reach = 1.4
            allow_collision = true
            ik_seed = [0.0, 0.1, 0.0]
            tie_break = "last_found"

            [tcp_offset]
            position = [0.0, 0.0, 0.12]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rail_resolution, vec![0.25, 0.5]);
        assert_relative_eq!(cfg.robot_reach, 1.4);
        assert!(cfg.allow_collision);
        assert_eq!(cfg.ik_seed, Some(vec![0.0, 0.1, 0.0]));
        assert_eq!(cfg.tie_break, TieBreak::LastFound);
        assert_eq!(cfg.tcp_offset.orientation, [0.0, 0.0, 0.0, 1.0]);
        let tcp = cfg.tcp_offset.to_pose().unwrap();
        assert_relative_eq!(tcp.translation.z, 0.12);
    }

    #[test]
    fn from_toml_minimal_uses_defaults() {
        let cfg = SamplerConfig::from_toml_str("rail_resolution = [0.1]").unwrap();
        assert_relative_eq!(cfg.robot_reach, 1.0);
        assert!(!cfg.allow_collision);
    }

    #[test]
    fn from_toml_missing_resolution_fails() {
        let err = SamplerConfig::from_toml_str("robot_reach = 2.0").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn from_toml_invalid_value_fails_validation() {
        let err = SamplerConfig::from_toml_str("rail_resolution = [0.0]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResolution { .. }));
    }

    #[test]
    fn from_missing_file_is_io_error() {
        let err = SamplerConfig::from_file("/nonexistent/railgrid.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    // ---- PoseConfig ----

    #[test]
    fn pose_config_roundtrip_through_pose() {
        let pose = Pose::from_parts(
            Translation3::new(1.0, -2.0, 0.5),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        let cfg = PoseConfig::from(&pose);
        let back = cfg.to_pose().unwrap();
        assert_relative_eq!(back, pose, epsilon = 1e-12);
    }

    #[test]
    fn pose_config_normalizes_quaternion() {
        let cfg = PoseConfig {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 2.0],
        };
        let pose = cfg.to_pose().unwrap();
        assert_relative_eq!(pose.rotation.angle(), 0.0);
    }
}
