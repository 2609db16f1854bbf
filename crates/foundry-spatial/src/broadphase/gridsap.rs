//! Uniform grid + sweep-and-prune per cell, bucketed along a configurable
//! axis or axis pair (spec §4.5.3 `GridSAP`).

use std::any::Any;

use foundry_core::Aabb;

use super::grid_common::{AxisProjection, CellBuckets};
use super::BroadPhase;
use crate::config::GridSapAxis;

fn to_projection(axis: GridSapAxis) -> AxisProjection {
    match axis {
        GridSapAxis::X => AxisProjection::X,
        GridSapAxis::Z => AxisProjection::Z,
        GridSapAxis::Xz => AxisProjection::Xz,
    }
}

/// Uniform-grid broad-phase bucketing shapes by their primary axis (or
/// axis pair), independent of any world bounds.
pub struct GridSap {
    buckets: CellBuckets,
}

impl GridSap {
    /// Construct a grid with the given cell size and primary axis.
    pub fn new(cell_size: f32, axis: GridSapAxis) -> Self {
        GridSap { buckets: CellBuckets::new(cell_size, to_projection(axis)) }
    }
}

impl BroadPhase for GridSap {
    fn strategy_name(&self) -> &'static str {
        "GridSAP"
    }

    fn insert(&mut self, index: usize, aabb: Aabb) {
        self.buckets.insert(index, aabb);
    }

    fn remove(&mut self, index: usize, _aabb: Aabb) {
        self.buckets.remove(index);
    }

    fn update(&mut self, index: usize, _old_aabb: Aabb, new_aabb: Aabb) {
        self.buckets.update(index, new_aabb);
    }

    fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        self.buckets.query(query_aabb, out);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
