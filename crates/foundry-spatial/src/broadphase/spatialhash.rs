//! Uniform-cell spatial hash with O(1) expected insert/remove/update/query
//! (spec §4.5.3 `SpatialHash`).

use std::any::Any;

use foundry_core::Aabb;

use super::grid_common::{AxisProjection, CellBuckets};
use super::BroadPhase;

/// Uniform-cell hash over all three axes. Unlike [`super::GridSap`], cells
/// are never collapsed along any axis.
pub struct SpatialHash {
    buckets: CellBuckets,
}

impl SpatialHash {
    /// Construct a spatial hash with the given cell edge length.
    pub fn new(cell_size: f32) -> Self {
        SpatialHash { buckets: CellBuckets::new(cell_size, AxisProjection::Xyz) }
    }
}

impl BroadPhase for SpatialHash {
    fn strategy_name(&self) -> &'static str {
        "SpatialHash"
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
