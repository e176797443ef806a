// railgrid-core: Types, collaborator traits, config and errors for railed IK sampling.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{PoseConfig, SamplerConfig, TieBreak};
pub use error::{ConfigError, SamplerError};
pub use traits::{
    CollisionCheck, RailKinematics, RobotKinematics, SolutionValidator, ToolPoseSampler,
};
pub use types::{EnvState, JointBounds, Pose, SolutionSet};
