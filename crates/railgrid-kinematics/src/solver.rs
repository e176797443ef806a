//! Iterative inverse kinematics for a [`KinematicChain`].
//!
//! [`DlsSolver`] runs damped least squares steps on the geometric Jacobian
//! from a single start configuration. [`DlsInverseKinematics`] restarts it
//! from several seeds and acts as the arm's [`RobotKinematics`].

use nalgebra::{DMatrix, DVector, Isometry3, Vector3};
use railgrid_core::{Pose, RobotKinematics};
use tracing::trace;

use crate::chain::{JointFrames, KinematicChain, Motion};

/// Step and stopping parameters for [`DlsSolver`].
#[derive(Debug, Clone)]
pub struct DlsConfig {
    pub max_iterations: u32,
    /// Converged once the tip is this close to the target (m).
    pub position_tolerance: f64,
    /// Converged once the residual rotation angle is below this (rad).
    pub angle_tolerance: f64,
    /// Lambda in `J^T (J J^T + lambda^2 I)^-1`.
    pub damping: f64,
}

impl Default for DlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            position_tolerance: 1e-6,
            angle_tolerance: 1e-5,
            damping: 0.01,
        }
    }
}

/// Outcome of one [`DlsSolver::solve`] run.
#[derive(Debug, Clone)]
pub struct IkResult {
    pub joint_positions: Vec<f64>,
    pub converged: bool,
    pub iterations: u32,
    /// Tip-to-target distance at the last iterate (m).
    pub position_error: f64,
    /// Residual rotation angle at the last iterate (rad).
    pub orientation_error: f64,
}

/// Single-start damped least squares solver.
#[derive(Debug, Clone)]
pub struct DlsSolver {
    config: DlsConfig,
}

/// Twist from the current tip to the target, linear part first.
struct Residual {
    position: f64,
    angle: f64,
    twist: DVector<f64>,
}

impl DlsSolver {
    pub const fn new(config: DlsConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DlsConfig::default())
    }

    pub const fn config(&self) -> &DlsConfig {
        &self.config
    }

    fn within_tolerance(&self, residual: &Residual) -> bool {
        residual.position < self.config.position_tolerance
            && residual.angle < self.config.angle_tolerance
    }

    /// Drive the tip of `chain` onto `target` starting from `q_init`.
    ///
    /// Iterates stay inside the joint limits. The result carries the last
    /// iterate even when the solver does not converge.
    ///
    /// # Panics
    ///
    /// Panics if `q_init.len() != chain.dof()`.
    pub fn solve(&self, chain: &KinematicChain, target: &Isometry3<f64>, q_init: &[f64]) -> IkResult {
        assert_eq!(q_init.len(), chain.dof(), "seed length mismatch");

        let mut q = q_init.to_vec();
        chain.clamp_joints(&mut q);
        let damping = DMatrix::<f64>::identity(6, 6) * self.config.damping.powi(2);
        let finish = |q: Vec<f64>, residual: &Residual, converged: bool, iterations: u32| IkResult {
            joint_positions: q,
            converged,
            iterations,
            position_error: residual.position,
            orientation_error: residual.angle,
        };

        for iteration in 0..self.config.max_iterations {
            let frames = chain.joint_frames(&q);
            let residual = pose_residual(&frames.tip, target);
            if self.within_tolerance(&residual) {
                return finish(q, &residual, true, iteration);
            }

            let jacobian = geometric_jacobian(chain, &frames);
            let jt = jacobian.transpose();
            let Some(inverse) = (&jacobian * &jt + &damping).try_inverse() else {
                trace!("railgrid-kinematics: damped normal matrix is singular");
                return finish(q, &residual, false, iteration);
            };

            let step = jt * inverse * &residual.twist;
            for (value, delta) in q.iter_mut().zip(step.iter()) {
                *value += delta;
            }
            chain.clamp_joints(&mut q);
        }

        let residual = pose_residual(&chain.forward_kinematics(&q), target);
        let converged = self.within_tolerance(&residual);
        finish(q, &residual, converged, self.config.max_iterations)
    }
}

fn pose_residual(tip: &Isometry3<f64>, target: &Isometry3<f64>) -> Residual {
    let linear = target.translation.vector - tip.translation.vector;
    let rotation = target.rotation * tip.rotation.inverse();
    let angular = rotation.scaled_axis();
    let mut twist = DVector::zeros(6);
    twist.fixed_rows_mut::<3>(0).copy_from(&linear);
    twist.fixed_rows_mut::<3>(3).copy_from(&angular);
    Residual {
        position: linear.norm(),
        angle: angular.norm(),
        twist,
    }
}

/// 6 x dof Jacobian in the base frame, linear rows on top.
fn geometric_jacobian(chain: &KinematicChain, frames: &JointFrames) -> DMatrix<f64> {
    let tip: Vector3<f64> = frames.tip.translation.vector;
    let mut jacobian = DMatrix::zeros(6, chain.dof());

    for (col, joint) in chain.joints().iter().enumerate() {
        let axis = &frames.axes[col];
        match joint.motion {
            Motion::Slide => jacobian.fixed_view_mut::<3, 1>(0, col).copy_from(axis),
            Motion::Rotate => {
                let lever = tip - frames.origins[col];
                jacobian.fixed_view_mut::<3, 1>(0, col).copy_from(&axis.cross(&lever));
                jacobian.fixed_view_mut::<3, 1>(3, col).copy_from(axis);
            }
        }
    }

    jacobian
}

// ---------------------------------------------------------------------------
// DlsInverseKinematics
// ---------------------------------------------------------------------------

/// Multi-start DLS solver exposed as a [`RobotKinematics`] collaborator.
///
/// Each call solves from the caller's seed first, then from every extra
/// seed, and reports the distinct converged branches in that order.
#[derive(Debug, Clone)]
pub struct DlsInverseKinematics {
    chain: KinematicChain,
    solver: DlsSolver,
    extra_seeds: Vec<Vec<f64>>,
    dedup_tolerance: f64,
}

impl DlsInverseKinematics {
    pub fn new(chain: KinematicChain, config: DlsConfig) -> Self {
        Self {
            chain,
            solver: DlsSolver::new(config),
            extra_seeds: Vec::new(),
            dedup_tolerance: 1e-4,
        }
    }

    /// Add restart seeds. Seeds of the wrong length are ignored at solve time.
    #[must_use]
    pub fn with_extra_seeds(mut self, seeds: Vec<Vec<f64>>) -> Self {
        self.extra_seeds = seeds;
        self
    }

    /// Max per-joint difference under which two branches count as one.
    #[must_use]
    pub const fn with_dedup_tolerance(mut self, tolerance: f64) -> Self {
        self.dedup_tolerance = tolerance;
        self
    }

    pub const fn chain(&self) -> &KinematicChain {
        &self.chain
    }
}

impl RobotKinematics for DlsInverseKinematics {
    fn dof(&self) -> usize {
        self.chain.dof()
    }

    fn inverse(&self, target: &Pose, seed: &[f64]) -> Option<Vec<f64>> {
        let dof = self.chain.dof();
        let mut branches: Vec<f64> = Vec::new();

        let seeds = std::iter::once(seed).chain(self.extra_seeds.iter().map(Vec::as_slice));
        for start in seeds.filter(|s| s.len() == dof) {
            let result = self.solver.solve(&self.chain, target, start);
            if !result.converged {
                continue;
            }
            let duplicate = branches.chunks_exact(dof.max(1)).any(|existing| {
                existing
                    .iter()
                    .zip(&result.joint_positions)
                    .all(|(a, b)| (a - b).abs() <= self.dedup_tolerance)
            });
            if !duplicate {
                branches.extend_from_slice(&result.joint_positions);
            }
        }

        if branches.is_empty() {
            trace!("railgrid-kinematics: no converged IK branch");
            None
        } else {
            Some(branches)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
