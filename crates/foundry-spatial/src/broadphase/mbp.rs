//! Multi-box pruning: the world is split into a fixed grid of bounded
//! regions; each region prunes its own members with a one-axis sweep (spec
//! §4.5.3 `MBP`, "requires world bounds").

use std::any::Any;

use foundry_core::Aabb;

use super::grid_common::{AxisProjection, CellBuckets};
use super::BroadPhase;

/// Region-bucketed broad-phase. Differs from [`super::GridSap`] only in
/// that its grid is anchored to a required, finite `world_bounds` rather
/// than spanning unboundedly in every direction — region indices are
/// clamped into range so shapes straddling or outside the configured
/// bounds still land in a valid region instead of growing the bucket map
/// without limit.
pub struct Mbp {
    buckets: CellBuckets,
    world_bounds: Aabb,
}

impl Mbp {
    /// Construct a multi-box-pruning grid covering `world_bounds` with
    /// `region_size`-edged regions.
    pub fn new(world_bounds: Aabb, region_size: f32) -> Self {
        Mbp { buckets: CellBuckets::new(region_size, AxisProjection::Xyz), world_bounds }
    }

    fn clamp_to_bounds(&self, aabb: Aabb) -> Aabb {
        let bounds = self.world_bounds;
        Aabb::new(
            foundry_core::Vector3::new(
                aabb.min.x.clamp(bounds.min.x, bounds.max.x),
                aabb.min.y.clamp(bounds.min.y, bounds.max.y),
                aabb.min.z.clamp(bounds.min.z, bounds.max.z),
            ),
            foundry_core::Vector3::new(
                aabb.max.x.clamp(bounds.min.x, bounds.max.x),
                aabb.max.y.clamp(bounds.min.y, bounds.max.y),
                aabb.max.z.clamp(bounds.min.z, bounds.max.z),
            ),
        )
    }
}

impl BroadPhase for Mbp {
    fn strategy_name(&self) -> &'static str {
        "MBP"
    }

    fn insert(&mut self, index: usize, aabb: Aabb) {
        self.buckets.insert(index, self.clamp_to_bounds(aabb));
    }

    fn remove(&mut self, index: usize, _aabb: Aabb) {
        self.buckets.remove(index);
    }

    fn update(&mut self, index: usize, _old_aabb: Aabb, new_aabb: Aabb) {
        self.buckets.update(index, self.clamp_to_bounds(new_aabb));
    }

    fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        self.buckets.query(self.clamp_to_bounds(query_aabb), out);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_core::Vector3;

    fn world() -> Aabb {
        Aabb::new(Vector3::new(-100.0, -100.0, -100.0), Vector3::new(100.0, 100.0, 100.0))
    }

    fn aabb_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vector3::new(x, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn shapes_in_different_regions_do_not_collide() {
        let mut mbp = Mbp::new(world(), 10.0);
        mbp.insert(0, aabb_at(0.0));
        mbp.insert(1, aabb_at(50.0));
        let mut out = Vec::new();
        mbp.query(aabb_at(0.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn out_of_bounds_shape_clamps_into_nearest_region() {
        let mut mbp = Mbp::new(world(), 10.0);
        mbp.insert(0, aabb_at(10_000.0));
        let mut out = Vec::new();
        mbp.query(aabb_at(100.0), &mut out);
        assert_eq!(out, vec![0]);
    }
}
