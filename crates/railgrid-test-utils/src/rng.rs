//! Deterministic RNG utilities for reproducible tests.

use nalgebra::{Translation3, UnitQuaternion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use railgrid_core::Pose;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Random pose with each position coordinate in `[-extent, extent]` and
/// a random orientation.
pub fn random_pose(rng: &mut impl Rng, extent: f64) -> Pose {
    let translation = Translation3::new(
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
    );
    let rotation = UnitQuaternion::from_euler_angles(
        rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI),
    );
    Pose::from_parts(translation, rotation)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
