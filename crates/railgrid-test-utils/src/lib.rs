//! Shared test fixtures for railgrid crates.
//!
//! Provides mock rail, IK and collision collaborators with call counters,
//! and deterministic RNG setup.

pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use mocks::{LinearRail, ScriptedCollision, ScriptedIk};
pub use rng::{random_pose, seeded_rng};
