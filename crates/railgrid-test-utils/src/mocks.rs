//! Mock collaborators for sampler tests.
//!
//! Every mock counts its calls with an atomic counter so tests can assert
//! on how often the sampler consulted it, while still being `Send + Sync`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use railgrid_core::{CollisionCheck, JointBounds, Pose, RailKinematics, RobotKinematics};

type Predicate = Box<dyn Fn(&[f64]) -> bool + Send + Sync>;
type IkScript = Box<dyn Fn(&Pose) -> Option<Vec<f64>> + Send + Sync>;
type Clearance = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

// ---------------------------------------------------------------------------
// LinearRail
// ---------------------------------------------------------------------------

/// Cartesian rail: DOF `i` translates the tip along world axis `i`
/// (X, Y, Z; at most three DOF).
pub struct LinearRail {
    limits: Vec<JointBounds>,
    base_link: String,
    reachable: Predicate,
    calls: AtomicUsize,
}

impl LinearRail {
    /// # Panics
    ///
    /// Panics if more than three DOF are requested.
    pub fn new(limits: Vec<JointBounds>) -> Self {
        assert!(limits.len() <= 3, "LinearRail supports at most three axes");
        Self {
            limits,
            base_link: "rail_base".to_string(),
            reachable: Box::new(|_: &[f64]| true),
            calls: AtomicUsize::new(0),
        }
    }

    /// One-axis rail over `[lower, upper]`.
    pub fn single(lower: f64, upper: f64) -> Self {
        Self::new(vec![JointBounds::new(lower, upper)])
    }

    /// Mark rail points for which `reachable` is false as unreachable.
    #[must_use]
    pub fn with_reachable(mut self, reachable: impl Fn(&[f64]) -> bool + Send + Sync + 'static) -> Self {
        self.reachable = Box::new(reachable);
        self
    }

    #[must_use]
    pub fn with_base_link(mut self, name: impl Into<String>) -> Self {
        self.base_link = name.into();
        self
    }

    /// Number of forward-kinematics calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl RailKinematics for LinearRail {
    fn dof(&self) -> usize {
        self.limits.len()
    }

    fn limits(&self) -> &[JointBounds] {
        &self.limits
    }

    fn base_link(&self) -> &str {
        &self.base_link
    }

    fn forward(&self, q: &[f64]) -> Option<Pose> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if q.len() != self.limits.len() || !(self.reachable)(q) {
            return None;
        }
        let mut offset = [0.0; 3];
        offset[..q.len()].copy_from_slice(q);
        Some(Pose::translation(offset[0], offset[1], offset[2]))
    }
}

// ---------------------------------------------------------------------------
// ScriptedIk
// ---------------------------------------------------------------------------

/// Arm IK answered by a closure of the robot-frame target.
pub struct ScriptedIk {
    dof: usize,
    script: IkScript,
    calls: AtomicUsize,
    last_seed: Mutex<Option<Vec<f64>>>,
}

impl ScriptedIk {
    pub fn new(dof: usize, script: impl Fn(&Pose) -> Option<Vec<f64>> + Send + Sync + 'static) -> Self {
        Self {
            dof,
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            last_seed: Mutex::new(None),
        }
    }

    /// IK that always returns the same packed branches.
    pub fn constant(dof: usize, branches: Vec<f64>) -> Self {
        Self::new(dof, move |_| Some(branches.clone()))
    }

    /// IK that never finds a solution.
    pub fn failing(dof: usize) -> Self {
        Self::new(dof, |_| None)
    }

    /// Number of IK calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Seed passed to the most recent call.
    ///
    /// # Panics
    ///
    /// Panics if the seed lock is poisoned.
    pub fn last_seed(&self) -> Option<Vec<f64>> {
        self.last_seed.lock().unwrap().clone()
    }
}

impl RobotKinematics for ScriptedIk {
    fn dof(&self) -> usize {
        self.dof
    }

    fn inverse(&self, target: &Pose, seed: &[f64]) -> Option<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_seed.lock() {
            *last = Some(seed.to_vec());
        }
        (self.script)(target)
    }
}

// ---------------------------------------------------------------------------
// ScriptedCollision
// ---------------------------------------------------------------------------

/// Collision capability answered by closures of the full joint vector.
pub struct ScriptedCollision {
    free: Predicate,
    clearance: Clearance,
    validate_calls: AtomicUsize,
    distance_calls: AtomicUsize,
}

impl ScriptedCollision {
    pub fn new(
        free: impl Fn(&[f64]) -> bool + Send + Sync + 'static,
        clearance: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            free: Box::new(free),
            clearance: Box::new(clearance),
            validate_calls: AtomicUsize::new(0),
            distance_calls: AtomicUsize::new(0),
        }
    }

    /// Every configuration collides; clearance from `clearance`.
    pub fn always_colliding(clearance: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::new(|_| false, clearance)
    }

    /// Every configuration is free with unit clearance.
    pub fn always_free() -> Self {
        Self::new(|_| true, |_| 1.0)
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::Relaxed)
    }

    pub fn distance_calls(&self) -> usize {
        self.distance_calls.load(Ordering::Relaxed)
    }
}

impl CollisionCheck for ScriptedCollision {
    fn validate(&self, q: &[f64]) -> bool {
        self.validate_calls.fetch_add(1, Ordering::Relaxed);
        (self.free)(q)
    }

    fn distance(&self, q: &[f64]) -> f64 {
        self.distance_calls.fetch_add(1, Ordering::Relaxed);
        (self.clearance)(q)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
