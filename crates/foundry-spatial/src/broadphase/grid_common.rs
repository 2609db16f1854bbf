//! Shared uniform-grid bucketing helpers for [`super::Mbp`], [`super::GridSap`],
//! and [`super::SpatialHash`] — the broad-phase equivalent of
//! `murk_space::grid2d`'s "shared helpers reused by multiple backends"
//! pattern, generalized from 2D integer grids to 3D float-cell buckets with
//! an optional per-axis projection (used by `GridSap`'s axis filter).

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;

use foundry_core::Aabb;

/// Integer grid-cell coordinate.
pub(crate) type CellCoord = (i32, i32, i32);

/// Which axes contribute to the cell coordinate; the others are collapsed
/// to `0` so a "band" along the ignored axis shares one bucket (spec
/// §4.5.3 `GridSAP`'s "configurable primary axis (X, Z) or both-axes
/// (XZ)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisProjection {
    X,
    Z,
    Xz,
    Xyz,
}

fn floor_cell(v: f32, cell_size: f32) -> i32 {
    (v / cell_size).floor() as i32
}

fn project(x: i32, y: i32, z: i32, axis: AxisProjection) -> CellCoord {
    match axis {
        AxisProjection::X => (x, 0, 0),
        AxisProjection::Z => (0, 0, z),
        AxisProjection::Xz => (x, 0, z),
        AxisProjection::Xyz => (x, y, z),
    }
}

fn cell_range(aabb: Aabb, cell_size: f32, axis: AxisProjection) -> (CellCoord, CellCoord) {
    let min = (
        floor_cell(aabb.min.x, cell_size),
        floor_cell(aabb.min.y, cell_size),
        floor_cell(aabb.min.z, cell_size),
    );
    let max = (
        floor_cell(aabb.max.x, cell_size),
        floor_cell(aabb.max.y, cell_size),
        floor_cell(aabb.max.z, cell_size),
    );
    (project(min.0, min.1, min.2, axis), project(max.0, max.1, max.2, axis))
}

/// A shape typically spans a handful of cells; inline storage avoids a
/// heap allocation for the common case.
pub(crate) type CellList = SmallVec<[CellCoord; 8]>;

/// Append every grid cell `aabb` overlaps (under `axis`'s projection) to
/// `out`, deduplicated.
pub(crate) fn cells_overlapping(aabb: Aabb, cell_size: f32, axis: AxisProjection, out: &mut CellList) {
    out.clear();
    let (min, max) = cell_range(aabb, cell_size, axis);
    for x in min.0..=max.0 {
        for y in min.1..=max.1 {
            for z in min.2..=max.2 {
                let cell = project(x, y, z, axis);
                if !out.contains(&cell) {
                    out.push(cell);
                }
            }
        }
    }
}

/// A multi-map from grid cell to the shape indices bucketed there, plus
/// the reverse index-to-cells map `remove`/`update` need to avoid a full
/// rescan. Shared core for every uniform-grid broad-phase strategy.
pub(crate) struct CellBuckets {
    cell_size: f32,
    axis: AxisProjection,
    buckets: IndexMap<CellCoord, Vec<usize>>,
    cells_of: HashMap<usize, CellList>,
    scratch_cells: RefCell<CellList>,
    scratch_seen: RefCell<std::collections::HashSet<usize>>,
}

impl CellBuckets {
    pub(crate) fn new(cell_size: f32, axis: AxisProjection) -> Self {
        CellBuckets {
            cell_size,
            axis,
            buckets: IndexMap::new(),
            cells_of: HashMap::new(),
            scratch_cells: RefCell::new(SmallVec::new()),
            scratch_seen: RefCell::new(std::collections::HashSet::new()),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, aabb: Aabb) {
        let mut cells = CellList::new();
        cells_overlapping(aabb, self.cell_size, self.axis, &mut cells);
        for &cell in &cells {
            self.buckets.entry(cell).or_default().push(index);
        }
        self.cells_of.insert(index, cells);
    }

    pub(crate) fn remove(&mut self, index: usize) {
        let Some(cells) = self.cells_of.remove(&index) else { return };
        for cell in cells {
            if let Some(bucket) = self.buckets.get_mut(&cell) {
                if let Some(pos) = bucket.iter().position(|&i| i == index) {
                    bucket.swap_remove(pos);
                }
                if bucket.is_empty() {
                    self.buckets.swap_remove(&cell);
                }
            }
        }
    }

    pub(crate) fn update(&mut self, index: usize, new_aabb: Aabb) {
        self.remove(index);
        self.insert(index, new_aabb);
    }

    pub(crate) fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        let mut cells = self.scratch_cells.borrow_mut();
        cells_overlapping(query_aabb, self.cell_size, self.axis, &mut cells);
        let mut seen = self.scratch_seen.borrow_mut();
        seen.clear();
        for cell in cells.iter() {
            if let Some(bucket) = self.buckets.get(cell) {
                for &index in bucket {
                    if seen.insert(index) {
                        out.push(index);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_core::Vector3;

    fn aabb_at(x: f32, z: f32) -> Aabb {
        Aabb::from_center_half_extents(Vector3::new(x, 0.0, z), Vector3::new(0.4, 0.4, 0.4))
    }

    #[test]
    fn query_finds_only_overlapping_cells() {
        let mut grid = CellBuckets::new(1.0, AxisProjection::Xyz);
        grid.insert(0, aabb_at(0.0, 0.0));
        grid.insert(1, aabb_at(10.0, 0.0));
        let mut out = Vec::new();
        grid.query(aabb_at(0.0, 0.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn x_axis_projection_collapses_z_and_y() {
        let mut grid = CellBuckets::new(1.0, AxisProjection::X);
        grid.insert(0, aabb_at(0.0, 0.0));
        let mut out = Vec::new();
        // Same X column, wildly different Z: still bucketed together.
        grid.query(aabb_at(0.0, 500.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn remove_drops_from_every_bucket() {
        let mut grid = CellBuckets::new(1.0, AxisProjection::Xyz);
        grid.insert(0, aabb_at(0.0, 0.0));
        grid.remove(0);
        let mut out = Vec::new();
        grid.query(aabb_at(0.0, 0.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn update_moves_between_cells() {
        let mut grid = CellBuckets::new(1.0, AxisProjection::Xyz);
        grid.insert(0, aabb_at(0.0, 0.0));
        grid.update(0, aabb_at(20.0, 0.0));
        let mut out = Vec::new();
        grid.query(aabb_at(0.0, 0.0), &mut out);
        assert!(out.is_empty());
        grid.query(aabb_at(20.0, 0.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn no_duplicate_index_across_spanned_cells() {
        let mut grid = CellBuckets::new(1.0, AxisProjection::Xyz);
        // Spans several cells.
        let wide = Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(3.0, 0.4, 0.4));
        grid.insert(0, wide);
        let mut out = Vec::new();
        grid.query(wide, &mut out);
        assert_eq!(out, vec![0]);
    }
}
