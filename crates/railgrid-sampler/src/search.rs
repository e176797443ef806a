//! Railed search driver.
//!
//! Walks the Cartesian product of the per-DOF rail samples with an index
//! odometer: the last DOF advances fastest and carries into the previous
//! one, which visits points in the same order as one nested loop per DOF.

use railgrid_core::Pose;

use crate::grid::RailGrid;
use crate::resolver::PointResolver;
use crate::stats::SearchStats;
use crate::strategy::SolutionStrategy;

/// Visit every rail point of `grid` in nested-loop order.
///
/// A zero-DOF grid yields one empty point. Any empty axis yields none.
pub fn for_each_point(grid: &RailGrid, mut visit: impl FnMut(&[f64])) {
    let axes = grid.axes();
    if axes.iter().any(Vec::is_empty) {
        return;
    }

    let mut index = vec![0usize; axes.len()];
    let mut point: Vec<f64> = axes.iter().map(|axis| axis[0]).collect();

    loop {
        visit(&point);

        // Advance the odometer from the last DOF.
        let mut dof = axes.len();
        loop {
            if dof == 0 {
                return;
            }
            dof -= 1;
            index[dof] += 1;
            if index[dof] < axes[dof].len() {
                point[dof] = axes[dof][index[dof]];
                break;
            }
            index[dof] = 0;
            point[dof] = axes[dof][0];
        }
    }
}

/// Resolve every rail point of `grid` for each rail-frame target, in
/// candidate order, feeding one strategy across the whole pass.
pub fn run_pass<S: SolutionStrategy>(
    grid: &RailGrid,
    targets: &[Pose],
    resolver: &PointResolver<'_>,
    strategy: &mut S,
) -> SearchStats {
    let mut stats = SearchStats::default();
    let mut scratch = Vec::new();
    for target in targets {
        for_each_point(grid, |point| {
            resolver.resolve(target, point, strategy, &mut stats, &mut scratch);
        });
    }
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
