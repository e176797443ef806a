//! Top-level railed sampler.
//!
//! [`RailedSampler`] is built once per waypoint. Each call to
//! [`sample`](RailedSampler::sample) runs:
//!
//! ```text
//! Init ──► CollectAll ──► found? ──► Done
//!                            │ no, collisions tolerated
//!                            ▼
//!                         Fallback ──► Done
//! ```
//!
//! Init builds the rail grid and the rail-frame targets. CollectAll walks
//! every tool-pose candidate and every rail point, keeping each valid,
//! collision-free full solution. Fallback repeats the identical walk and
//! keeps only the single solution with the largest clearance.

use std::sync::Arc;

use railgrid_core::{
    CollisionCheck, ConfigError, EnvState, Pose, RailKinematics, RobotKinematics,
    SamplerConfig, SamplerError, SolutionSet, SolutionValidator, TieBreak, ToolPoseSampler,
};
use tracing::debug;

use crate::frame::tool_pose_in_rail_frame;
use crate::grid::RailGrid;
use crate::resolver::PointResolver;
use crate::search::run_pass;
use crate::stats::SearchStats;
use crate::strategy::{BestOnly, CollectAll, SolutionStrategy};
use crate::tool_pose::FixedToolPose;

// ---------------------------------------------------------------------------
// SampleOutcome
// ---------------------------------------------------------------------------

/// Result of one sampling call.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Accepted full joint solutions (rail joints first).
    pub solutions: SolutionSet,
    /// The solutions come from the best-clearance fallback search.
    pub used_fallback: bool,
    /// Counters of the collect-all pass.
    pub collect_stats: SearchStats,
    /// Counters of the fallback pass, if it ran.
    pub fallback_stats: Option<SearchStats>,
}

impl SampleOutcome {
    /// Whether at least one solution was found.
    pub const fn found(&self) -> bool {
        !self.solutions.is_empty()
    }

    /// Counters of both passes combined.
    pub fn total_stats(&self) -> SearchStats {
        self.fallback_stats
            .map_or(self.collect_stats, |f| self.collect_stats.merged(f))
    }
}

// ---------------------------------------------------------------------------
// RailedSamplerBuilder
// ---------------------------------------------------------------------------

/// Builder for [`RailedSampler`].
///
/// The validator and the rail base transform (directly or through an
/// [`EnvState`]) are required. The tool-pose sampler defaults to
/// [`FixedToolPose`].
pub struct RailedSamplerBuilder {
    tool_pose: Pose,
    rail: Arc<dyn RailKinematics>,
    robot: Arc<dyn RobotKinematics>,
    config: SamplerConfig,
    collision: Option<Arc<dyn CollisionCheck>>,
    validator: Option<Arc<dyn SolutionValidator>>,
    tool_pose_sampler: Option<Arc<dyn ToolPoseSampler>>,
    rail_base_transform: Option<Pose>,
    env_state: Option<EnvState>,
}

impl RailedSamplerBuilder {
    /// Collision capability used for filtering and for the fallback search.
    #[must_use]
    pub fn with_collision(mut self, collision: Arc<dyn CollisionCheck>) -> Self {
        self.collision = Some(collision);
        self
    }

    /// Acceptance rule applied to every full solution.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn SolutionValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn with_tool_pose_sampler(mut self, sampler: Arc<dyn ToolPoseSampler>) -> Self {
        self.tool_pose_sampler = Some(sampler);
        self
    }

    /// World transform of the rail base. Takes precedence over
    /// [`with_env_state`](Self::with_env_state).
    #[must_use]
    pub const fn with_rail_base_transform(mut self, world_to_rail_base: Pose) -> Self {
        self.rail_base_transform = Some(world_to_rail_base);
        self
    }

    /// Environment state in which the rail's base link is looked up.
    #[must_use]
    pub fn with_env_state(mut self, env_state: EnvState) -> Self {
        self.env_state = Some(env_state);
        self
    }

    /// Validate the configuration and build the sampler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid, the rail
    /// limits or resolution do not match the rail dof, the IK seed length
    /// differs from the arm dof, a required collaborator is missing, the
    /// rail base link is absent from the environment state, the rail grid
    /// is unbuildable (non-finite limits or too many samples), or
    /// collisions are tolerated without a collision capability.
    pub fn build(self) -> Result<RailedSampler, ConfigError> {
        self.config.validate()?;

        let rail_dof = self.rail.dof();
        let robot_dof = self.robot.dof();
        if self.rail.limits().len() != rail_dof {
            return Err(ConfigError::DimensionMismatch {
                what: "rail limits",
                expected: rail_dof,
                got: self.rail.limits().len(),
            });
        }
        // Surfaces resolution and bound errors before the first call.
        let grid = RailGrid::new(self.rail.limits(), &self.config.rail_resolution)?;

        let validator = self.validator.ok_or(ConfigError::MissingField("validator"))?;

        let world_to_rail_base = match (self.rail_base_transform, &self.env_state) {
            (Some(pose), _) => pose,
            (None, Some(env)) => {
                let link = self.rail.base_link();
                *env
                    .transform(link)
                    .ok_or_else(|| ConfigError::MissingLink(link.to_string()))?
            }
            (None, None) => return Err(ConfigError::MissingField("rail_base_transform")),
        };

        let ik_seed = self
            .config
            .ik_seed
            .clone()
            .unwrap_or_else(|| vec![0.0; robot_dof]);
        if ik_seed.len() != robot_dof {
            return Err(ConfigError::DimensionMismatch {
                what: "ik_seed",
                expected: robot_dof,
                got: ik_seed.len(),
            });
        }

        if self.config.allow_collision && self.collision.is_none() {
            return Err(ConfigError::MissingCollision);
        }

        let tcp_offset = self.config.tcp_offset.to_pose()?;
        let tool_pose_sampler: Arc<dyn ToolPoseSampler> = match self.tool_pose_sampler {
            Some(sampler) => sampler,
            None => Arc::new(FixedToolPose),
        };

        debug!(
            "railgrid-sampler: built sampler with {rail_dof} rail + {robot_dof} arm dof, {} rail point(s)",
            grid.point_count()
        );

        Ok(RailedSampler {
            tool_pose: self.tool_pose,
            tool_pose_sampler,
            rail: self.rail,
            robot: self.robot,
            collision: self.collision,
            validator,
            world_to_rail_base,
            tcp_offset,
            rail_resolution: self.config.rail_resolution,
            robot_reach: self.config.robot_reach,
            allow_collision: self.config.allow_collision,
            tie_break: self.config.tie_break,
            ik_seed,
            dof: rail_dof + robot_dof,
        })
    }
}

// ---------------------------------------------------------------------------
// RailedSampler
// ---------------------------------------------------------------------------

/// Joint-space sampler for a robot arm mounted on a rail.
///
/// Holds only immutable configuration and shared collaborators. Every
/// sampling call keeps its working state local, so one sampler can be
/// shared across threads.
pub struct RailedSampler {
    tool_pose: Pose,
    tool_pose_sampler: Arc<dyn ToolPoseSampler>,
    rail: Arc<dyn RailKinematics>,
    robot: Arc<dyn RobotKinematics>,
    collision: Option<Arc<dyn CollisionCheck>>,
    validator: Arc<dyn SolutionValidator>,
    world_to_rail_base: Pose,
    tcp_offset: Pose,
    rail_resolution: Vec<f64>,
    robot_reach: f64,
    allow_collision: bool,
    tie_break: TieBreak,
    ik_seed: Vec<f64>,
    dof: usize,
}

impl RailedSampler {
    /// Start building a sampler for `tool_pose` (world frame).
    pub fn builder(
        tool_pose: Pose,
        rail: Arc<dyn RailKinematics>,
        robot: Arc<dyn RobotKinematics>,
        config: SamplerConfig,
    ) -> RailedSamplerBuilder {
        RailedSamplerBuilder {
            tool_pose,
            rail,
            robot,
            config,
            collision: None,
            validator: None,
            tool_pose_sampler: None,
            rail_base_transform: None,
            env_state: None,
        }
    }

    /// Length of every full solution (rail dof + arm dof).
    pub const fn dof(&self) -> usize {
        self.dof
    }

    pub fn rail_dof(&self) -> usize {
        self.rail.dof()
    }

    pub fn robot_dof(&self) -> usize {
        self.robot.dof()
    }

    pub const fn tool_pose(&self) -> &Pose {
        &self.tool_pose
    }

    pub const fn world_to_rail_base(&self) -> &Pose {
        &self.world_to_rail_base
    }

    pub fn ik_seed(&self) -> &[f64] {
        &self.ik_seed
    }

    pub const fn allow_collision(&self) -> bool {
        self.allow_collision
    }

    /// Tool-pose candidates expressed in the rail base frame with the TCP
    /// offset removed, in sampler order.
    pub fn rail_frame_targets(&self) -> Vec<Pose> {
        self.tool_pose_sampler
            .sample(&self.tool_pose)
            .iter()
            .map(|pose| tool_pose_in_rail_frame(pose, &self.world_to_rail_base, &self.tcp_offset))
            .collect()
    }

    /// Find joint solutions for the tool pose.
    ///
    /// Runs the collect-all pass and, if it finds nothing while collisions
    /// are tolerated, the best-clearance fallback.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Config`] if the rail grid cannot be built
    /// from the rail's current limits.
    pub fn sample(&self) -> Result<SampleOutcome, SamplerError> {
        let grid = self.grid()?;
        let targets = self.rail_frame_targets();
        debug!(
            "railgrid-sampler: sampling {} tool pose candidate(s) over {} rail point(s)",
            targets.len(),
            grid.point_count()
        );

        let resolver = self.resolver();
        let mut collect = CollectAll::new(self.dof, self.collision.as_deref());
        let collect_stats = run_pass(&grid, &targets, &resolver, &mut collect);
        let solutions = collect.into_solutions();

        let outcome = match self.collision.as_deref() {
            Some(collision) if solutions.is_empty() && self.allow_collision => {
                debug!("railgrid-sampler: no collision-free solution, searching best clearance");
                let (best, fallback_stats) = self.fallback(&grid, &targets, collision);
                SampleOutcome {
                    used_fallback: !best.is_empty(),
                    solutions: best,
                    collect_stats,
                    fallback_stats: Some(fallback_stats),
                }
            }
            _ => SampleOutcome {
                solutions,
                used_fallback: false,
                collect_stats,
                fallback_stats: None,
            },
        };

        debug!(
            "railgrid-sampler: found {} solution(s){}",
            outcome.solutions.len(),
            if outcome.used_fallback { " via fallback" } else { "" }
        );
        Ok(outcome)
    }

    /// Append solutions to a caller buffer; returns whether any were found.
    ///
    /// # Errors
    ///
    /// Same as [`sample`](Self::sample). `out` is untouched on error.
    pub fn sample_into(&self, out: &mut Vec<f64>) -> Result<bool, SamplerError> {
        let outcome = self.sample()?;
        out.extend_from_slice(outcome.solutions.as_slice());
        Ok(outcome.found())
    }

    /// Run only the best-clearance search, regardless of collision
    /// tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCollision`] if the sampler has no
    /// collision capability, or a grid error as in
    /// [`sample`](Self::sample).
    pub fn best_solution(&self) -> Result<(SolutionSet, SearchStats), SamplerError> {
        let collision = self
            .collision
            .as_deref()
            .ok_or(ConfigError::MissingCollision)?;
        let grid = self.grid()?;
        let targets = self.rail_frame_targets();
        Ok(self.fallback(&grid, &targets, collision))
    }

    fn grid(&self) -> Result<RailGrid, ConfigError> {
        RailGrid::new(self.rail.limits(), &self.rail_resolution)
    }

    fn resolver(&self) -> PointResolver<'_> {
        PointResolver {
            rail: self.rail.as_ref(),
            robot: self.robot.as_ref(),
            validator: self.validator.as_ref(),
            robot_reach: self.robot_reach,
            ik_seed: &self.ik_seed,
        }
    }

    fn fallback(
        &self,
        grid: &RailGrid,
        targets: &[Pose],
        collision: &dyn CollisionCheck,
    ) -> (SolutionSet, SearchStats) {
        let mut best = BestOnly::new(self.dof, collision, self.tie_break);
        let stats = run_pass(grid, targets, &self.resolver(), &mut best);
        if let Some(distance) = best.best_distance() {
            debug!("railgrid-sampler: best clearance {distance}");
        }
        (best.into_solutions(), stats)
    }
}

impl std::fmt::Debug for RailedSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RailedSampler")
            .field("tool_pose", &self.tool_pose)
            .field("dof", &self.dof)
            .field("rail_resolution", &self.rail_resolution)
            .field("robot_reach", &self.robot_reach)
            .field("allow_collision", &self.allow_collision)
            .field("tie_break", &self.tie_break)
            .field("has_collision", &self.collision.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
