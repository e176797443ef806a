//! Collision capability built from a clearance function.

use railgrid_core::CollisionCheck;

/// Wraps a signed clearance function. A configuration is collision-free
/// when its clearance is at least `margin`.
pub struct ClearanceFn<F> {
    clearance: F,
    margin: f64,
}

impl<F> ClearanceFn<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub const fn new(clearance: F, margin: f64) -> Self {
        Self { clearance, margin }
    }

    pub const fn margin(&self) -> f64 {
        self.margin
    }
}

impl<F> CollisionCheck for ClearanceFn<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn validate(&self, q: &[f64]) -> bool {
        self.distance(q) >= self.margin
    }

    fn distance(&self, q: &[f64]) -> f64 {
        (self.clearance)(q)
    }
}

impl<F> std::fmt::Debug for ClearanceFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClearanceFn")
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
