//! Reference kinematics collaborators for the railed sampler.
//!
//! Provides forward kinematics for serial chains of revolute and prismatic
//! joints, a chain-backed [`RailKinematics`](railgrid_core::RailKinematics)
//! implementation, and a Damped Least Squares (Levenberg-Marquardt) IK
//! solver exposed as [`RobotKinematics`](railgrid_core::RobotKinematics).
//!
//! # Architecture
//!
//! ```text
//! ChainSpec ──► KinematicChain ──┬─► ChainRail             (rail FK)
//!                                └─► DlsInverseKinematics  (arm IK branches)
//! ```

pub mod chain;
pub mod rail;
pub mod solver;

pub use chain::{
    ChainError, ChainJoint, ChainSpec, JointFrames, JointKind, JointSpec, KinematicChain, Motion,
    OriginSpec,
};
pub use rail::ChainRail;
pub use solver::{DlsConfig, DlsInverseKinematics, DlsSolver, IkResult};
