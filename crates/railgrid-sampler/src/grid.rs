//! Rail grid: per-DOF sample sequences over the rail limits.

use railgrid_core::{ConfigError, JointBounds};

/// Largest number of samples a single rail DOF may be split into.
pub const MAX_SAMPLES_PER_DOF: usize = 1_000_000;

/// Largest number of rail points in the full grid.
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Ordered rail samples, one sequence per rail DOF.
///
/// Each sequence starts at the lower bound, ends at the upper bound, and is
/// evenly spaced with a step no larger than the DOF's resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RailGrid {
    axes: Vec<Vec<f64>>,
}

impl RailGrid {
    /// Discretize `limits` with the per-DOF `resolution`.
    ///
    /// # Errors
    ///
    /// Fails if the lengths differ, a resolution is not strictly positive
    /// and finite, a bound is not finite, a lower bound exceeds its upper
    /// bound, or the grid would exceed [`MAX_SAMPLES_PER_DOF`] on one DOF
    /// or [`MAX_GRID_POINTS`] overall.
    pub fn new(limits: &[JointBounds], resolution: &[f64]) -> Result<Self, ConfigError> {
        if limits.len() != resolution.len() {
            return Err(ConfigError::DimensionMismatch {
                what: "rail_resolution",
                expected: limits.len(),
                got: resolution.len(),
            });
        }

        let axes = limits
            .iter()
            .zip(resolution)
            .enumerate()
            .map(|(dof, (bounds, &step))| {
                if !(step.is_finite() && step > 0.0) {
                    return Err(ConfigError::InvalidResolution { dof, value: step });
                }
                if !(bounds.lower.is_finite() && bounds.upper.is_finite()) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("rail_limits[{dof}]"),
                        message: format!(
                            "bounds must be finite, got [{}, {}]",
                            bounds.lower, bounds.upper
                        ),
                    });
                }
                if bounds.lower > bounds.upper {
                    return Err(ConfigError::InvertedBounds {
                        dof,
                        lower: bounds.lower,
                        upper: bounds.upper,
                    });
                }
                let count = sample_count(bounds.span(), step).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: format!("rail_resolution[{dof}]"),
                        message: format!(
                            "step {step} splits a span of {} into more than \
                             {MAX_SAMPLES_PER_DOF} samples",
                            bounds.span()
                        ),
                    }
                })?;
                Ok(linspace(count, bounds.lower, bounds.upper))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let points = axes
            .iter()
            .try_fold(1_usize, |acc, axis| acc.checked_mul(axis.len()))
            .filter(|&points| points <= MAX_GRID_POINTS);
        if points.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "rail_resolution".into(),
                message: format!("grid has more than {MAX_GRID_POINTS} rail points"),
            });
        }

        Ok(Self { axes })
    }

    /// Number of rail DOF.
    pub fn dof(&self) -> usize {
        self.axes.len()
    }

    /// Samples of one rail DOF.
    ///
    /// # Panics
    ///
    /// Panics if `dof >= self.dof()`.
    pub fn axis(&self, dof: usize) -> &[f64] {
        &self.axes[dof]
    }

    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Number of rail points in the Cartesian product of all axes.
    /// A zero-DOF grid has exactly one (empty) point.
    pub fn point_count(&self) -> usize {
        self.axes.iter().map(Vec::len).product()
    }
}

/// Samples needed so consecutive values are at most `step` apart, or
/// `None` past [`MAX_SAMPLES_PER_DOF`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn sample_count(span: f64, step: f64) -> Option<usize> {
    let intervals = (span / step).ceil();
    if !intervals.is_finite() || intervals >= MAX_SAMPLES_PER_DOF as f64 {
        return None;
    }
    (intervals as usize).checked_add(1)
}

/// `count` evenly spaced values from `low` to `high` inclusive.
#[allow(clippy::cast_precision_loss)]
fn linspace(count: usize, low: f64, high: f64) -> Vec<f64> {
    if count <= 1 {
        return vec![low];
    }
    let last = count - 1;
    let step = (high - low) / last as f64;
    (0..count)
        .map(|i| if i == last { high } else { low + step * i as f64 })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
