use std::collections::HashMap;

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

/// Rigid transform used for tool poses and link frames.
pub type Pose = Isometry3<f64>;

// ---------------------------------------------------------------------------
// JointBounds
// ---------------------------------------------------------------------------

/// Closed position interval `[lower, upper]` of a single joint (rad or m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointBounds {
    pub lower: f64,
    pub upper: f64,
}

impl JointBounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Absolute width of the interval.
    pub fn span(&self) -> f64 {
        (self.upper - self.lower).abs()
    }

    /// Whether `value` lies in the interval, widened by `tolerance` on both sides.
    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

impl From<[f64; 2]> for JointBounds {
    fn from([lower, upper]: [f64; 2]) -> Self {
        Self::new(lower, upper)
    }
}

// ---------------------------------------------------------------------------
// SolutionSet
// ---------------------------------------------------------------------------

/// Flat buffer of full joint solutions, each exactly `dof` scalars long.
///
/// Solutions are stored back to back; the buffer length is always a multiple
/// of [`dof`](Self::dof).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSet {
    dof: usize,
    data: Vec<f64>,
}

impl SolutionSet {
    pub const fn new(dof: usize) -> Self {
        Self {
            dof,
            data: Vec::new(),
        }
    }

    /// Length of every solution in the set.
    pub const fn dof(&self) -> usize {
        self.dof
    }

    /// Number of solutions (not scalars).
    pub fn len(&self) -> usize {
        if self.dof == 0 {
            0
        } else {
            self.data.len() / self.dof
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one solution.
    ///
    /// # Panics
    ///
    /// Panics if `solution.len() != self.dof()`.
    pub fn push(&mut self, solution: &[f64]) {
        assert_eq!(
            solution.len(),
            self.dof,
            "solution length must equal sampler dof"
        );
        self.data.extend_from_slice(solution);
    }

    /// Drop every stored solution and store `solution` alone.
    pub fn replace_with(&mut self, solution: &[f64]) {
        self.data.clear();
        self.push(solution);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Solution at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dof)?;
        self.data.get(start..start + self.dof)
    }

    /// Iterate over solutions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dof.max(1))
    }

    /// The flat scalar buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

// ---------------------------------------------------------------------------
// EnvState
// ---------------------------------------------------------------------------

/// Snapshot of world transforms keyed by link name.
#[derive(Debug, Clone, Default)]
pub struct EnvState {
    transforms: HashMap<String, Pose>,
}

impl EnvState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the world transform of a link. Returns `self` for chaining.
    #[must_use]
    pub fn with_link(mut self, name: impl Into<String>, pose: Pose) -> Self {
        self.insert(name, pose);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, pose: Pose) {
        self.transforms.insert(name.into(), pose);
    }

    /// World transform of `name`, if known.
    pub fn transform(&self, name: &str) -> Option<&Pose> {
        self.transforms.get(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
