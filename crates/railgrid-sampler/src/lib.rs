//! Joint-space sampling for a robot arm carried by a rail.
//!
//! Given a desired tool pose, [`RailedSampler`] discretizes the rail's joint
//! limits into a grid, solves arm IK at every rail point, and returns every
//! valid collision-free full joint solution (rail joints followed by arm
//! joints). When nothing is collision-free and collisions are tolerated, it
//! falls back to the single solution with the largest clearance.
//!
//! # Architecture
//!
//! ```text
//! RailedSampler::sample
//!   ├── RailGrid            per-DOF samples over the rail limits
//!   ├── ToolPoseSampler     nominal pose ─► candidates
//!   ├── tool_pose_in_rail_frame
//!   └── run_pass            odometer over grid × candidates
//!         └── PointResolver rail FK ─► reach filter ─► IK ─► validity
//!               └── SolutionStrategy   CollectAll | BestOnly
//! ```

pub mod collision;
pub mod frame;
pub mod grid;
pub mod resolver;
pub mod sampler;
pub mod search;
pub mod stats;
pub mod strategy;
pub mod tool_pose;
pub mod validity;

pub use collision::ClearanceFn;
pub use frame::tool_pose_in_rail_frame;
pub use grid::RailGrid;
pub use resolver::PointResolver;
pub use sampler::{RailedSampler, RailedSamplerBuilder, SampleOutcome};
pub use search::{for_each_point, run_pass};
pub use stats::{SearchStats, SkipReason};
pub use strategy::{BestOnly, CollectAll, SolutionStrategy};
pub use tool_pose::{AxisSymmetricToolPose, FixedToolPose};
pub use validity::{AcceptAll, JointLimitValidator};
