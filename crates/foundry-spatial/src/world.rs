//! The public spatial-world facade (spec §4.5.1/§4.5.2): owns the
//! [`ShapeRegistry`] and a pluggable [`BroadPhase`], and answers the six
//! typed query operations by combining broad-phase candidate gathering
//! with per-shape narrow-phase tests.

use std::cell::RefCell;

use foundry_core::Vector3;

use crate::broadphase::{Bvh, BroadPhase, Dbvt, GridSap, Mbp, Octree, SpatialHash};
use crate::config::{BroadPhaseKind, SpatialWorldConfig};
use crate::error::SpatialError;
use crate::narrowphase::{self, NarrowHit};
use crate::registry::{ShapeRef, ShapeRegistry};
use crate::shape::{BoxParams, CapsuleParams, CylinderParams, ShapeHandle, SphereParams};

/// Default include-mask: every layer passes (spec §6 "default include-mask
/// is all-ones").
pub const DEFAULT_INCLUDE_MASK: u32 = u32::MAX;
/// Default exclude-mask: no layer is excluded (spec §6 "default
/// exclude-mask is zero").
pub const DEFAULT_EXCLUDE_MASK: u32 = 0;

fn passes_mask(shape_mask: u32, include_mask: u32, exclude_mask: u32) -> bool {
    (shape_mask & include_mask) != 0 && (shape_mask & exclude_mask) == 0
}

/// A single query result (spec §6): `shape_index == -1` denotes "no hit",
/// used as the sentinel `HitResult` query output buffers are padded with
/// (never actually written by `query_*`/`raycast*`, which only ever write
/// as many slots as they have real hits for).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Raw registry index of the shape hit, or `-1` for "no hit".
    pub shape_index: i32,
    /// Ray parameter, penetration depth, or normalized time-of-impact,
    /// depending on which query produced this result.
    pub distance: f32,
    /// World-space contact point.
    pub point: Vector3,
    /// Unit-length surface normal at the contact point.
    pub normal: Vector3,
}

impl HitResult {
    /// The canonical "no hit" sentinel.
    pub const NONE: HitResult =
        HitResult { shape_index: -1, distance: 0.0, point: Vector3::ZERO, normal: Vector3::ZERO };
}

fn to_hit_result(index: usize, hit: NarrowHit) -> HitResult {
    HitResult { shape_index: index as i32, distance: hit.distance, point: hit.point, normal: hit.normal }
}

/// A ray query (spec §4.5.2 `raycast`/`raycast_all`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    /// Ray origin.
    pub origin: Vector3,
    /// Ray direction; need not be pre-normalized (normalized internally).
    pub direction: Vector3,
    /// Maximum hit distance along the ray.
    pub max_distance: f32,
    /// Inclusive layer mask.
    pub include_mask: u32,
    /// Exclusive layer mask.
    pub exclude_mask: u32,
}

impl RayQuery {
    /// A ray with default (pass-everything) layer masks.
    pub fn new(origin: Vector3, direction: Vector3, max_distance: f32) -> Self {
        RayQuery { origin, direction, max_distance, include_mask: DEFAULT_INCLUDE_MASK, exclude_mask: DEFAULT_EXCLUDE_MASK }
    }
}

/// A sphere-overlap query (spec §4.5.2 `query_sphere_overlap`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereOverlapQuery {
    /// Query sphere center.
    pub center: Vector3,
    /// Query sphere radius.
    pub radius: f32,
    /// Inclusive layer mask.
    pub include_mask: u32,
    /// Exclusive layer mask.
    pub exclude_mask: u32,
}

impl SphereOverlapQuery {
    /// A sphere-overlap query with default layer masks.
    pub fn new(center: Vector3, radius: f32) -> Self {
        SphereOverlapQuery { center, radius, include_mask: DEFAULT_INCLUDE_MASK, exclude_mask: DEFAULT_EXCLUDE_MASK }
    }
}

/// A capsule-sweep query (spec §4.5.2 `capsule_sweep`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleSweepQuery {
    /// Start of the swept segment.
    pub start: Vector3,
    /// End of the swept segment.
    pub end: Vector3,
    /// Sweep radius.
    pub radius: f32,
    /// Inclusive layer mask.
    pub include_mask: u32,
    /// Exclusive layer mask.
    pub exclude_mask: u32,
}

impl CapsuleSweepQuery {
    /// A capsule sweep with default layer masks.
    pub fn new(start: Vector3, end: Vector3, radius: f32) -> Self {
        CapsuleSweepQuery { start, end, radius, include_mask: DEFAULT_INCLUDE_MASK, exclude_mask: DEFAULT_EXCLUDE_MASK }
    }
}

/// A slash (blade-swept quad) query (spec §4.5.2 `query_slash`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashQuery {
    /// The four corners of the swept quad, in winding order.
    pub corners: [Vector3; 4],
    /// Inclusive layer mask.
    pub include_mask: u32,
    /// Exclusive layer mask.
    pub exclude_mask: u32,
}

impl SlashQuery {
    /// A slash query with default layer masks.
    pub fn new(corners: [Vector3; 4]) -> Self {
        SlashQuery { corners, include_mask: DEFAULT_INCLUDE_MASK, exclude_mask: DEFAULT_EXCLUDE_MASK }
    }

    fn aabb(&self) -> foundry_core::Aabb {
        let mut aabb = foundry_core::Aabb::from_points(self.corners[0], self.corners[1]);
        aabb = aabb.merge(foundry_core::Aabb::from_points(self.corners[2], self.corners[3]));
        aabb
    }
}

fn build_broadphase(config: &SpatialWorldConfig) -> Box<dyn BroadPhase> {
    match config.strategy {
        BroadPhaseKind::Bvh => Box::new(Bvh::new()),
        BroadPhaseKind::Dbvt { margin } => Box::new(Dbvt::new(margin)),
        BroadPhaseKind::Octree { max_depth } => {
            Box::new(Octree::new(config.world_bounds.expect("validated"), max_depth))
        }
        BroadPhaseKind::Mbp { region_size } => {
            Box::new(Mbp::new(config.world_bounds.expect("validated"), region_size))
        }
        BroadPhaseKind::GridSap { cell_size, axis } => Box::new(GridSap::new(cell_size, axis)),
        BroadPhaseKind::SpatialHash { cell_size } => Box::new(SpatialHash::new(cell_size)),
    }
}

/// Two-phase spatial query engine: owns every registered shape and the
/// broad-phase strategy chosen at construction (spec §4.5, §4.5.3
/// "Selection is made at world construction").
pub struct SpatialWorld {
    registry: ShapeRegistry,
    broadphase: Box<dyn BroadPhase>,
    candidate_scratch: RefCell<Vec<usize>>,
    hit_scratch: RefCell<Vec<HitResult>>,
}

impl SpatialWorld {
    /// Construct a world from `config`, rejecting inconsistent
    /// configuration (spec §7 "Spawn/despawn callback" table's sibling
    /// rule for spatial-world construction-time validation).
    pub fn new(config: SpatialWorldConfig) -> Result<Self, SpatialError> {
        config.validate()?;
        let capacity = config.candidate_buffer_capacity;
        Ok(SpatialWorld {
            registry: ShapeRegistry::new(),
            broadphase: build_broadphase(&config),
            candidate_scratch: RefCell::new(Vec::with_capacity(capacity)),
            hit_scratch: RefCell::new(Vec::with_capacity(capacity)),
        })
    }

    /// Register a sphere (spec §4.5.1 `add_sphere`).
    pub fn add_sphere(&mut self, params: SphereParams, is_static: bool, user_data: i64, layer_mask: u32) -> ShapeHandle {
        let (handle, aabb) = self.registry.insert_sphere(params, is_static, user_data, layer_mask);
        self.broadphase.insert(handle.index(), aabb);
        handle
    }

    /// Register a capsule (spec §4.5.1 `add_capsule`).
    pub fn add_capsule(&mut self, params: CapsuleParams, is_static: bool, user_data: i64, layer_mask: u32) -> ShapeHandle {
        let (handle, aabb) = self.registry.insert_capsule(params, is_static, user_data, layer_mask);
        self.broadphase.insert(handle.index(), aabb);
        handle
    }

    /// Register a cylinder (spec §4.5.1 `add_cylinder`).
    pub fn add_cylinder(&mut self, params: CylinderParams, is_static: bool, user_data: i64, layer_mask: u32) -> ShapeHandle {
        let (handle, aabb) = self.registry.insert_cylinder(params, is_static, user_data, layer_mask);
        self.broadphase.insert(handle.index(), aabb);
        handle
    }

    /// Register a box (spec §4.5.1 `add_box`).
    pub fn add_box(&mut self, params: BoxParams, is_static: bool, user_data: i64, layer_mask: u32) -> ShapeHandle {
        let (handle, aabb) = self.registry.insert_box(params, is_static, user_data, layer_mask);
        self.broadphase.insert(handle.index(), aabb);
        handle
    }

    /// Update a sphere's parameters; a silent no-op if `handle` is invalid
    /// or does not refer to a sphere (spec §4.5.1 `update_sphere`).
    pub fn update_sphere(&mut self, handle: ShapeHandle, params: SphereParams) {
        if let Some((old, new)) = self.registry.update_sphere(handle, params) {
            self.broadphase.update(handle.index(), old, new);
        }
    }

    /// Update a capsule's parameters; see [`Self::update_sphere`].
    pub fn update_capsule(&mut self, handle: ShapeHandle, params: CapsuleParams) {
        if let Some((old, new)) = self.registry.update_capsule(handle, params) {
            self.broadphase.update(handle.index(), old, new);
        }
    }

    /// Update a cylinder's parameters; see [`Self::update_sphere`].
    pub fn update_cylinder(&mut self, handle: ShapeHandle, params: CylinderParams) {
        if let Some((old, new)) = self.registry.update_cylinder(handle, params) {
            self.broadphase.update(handle.index(), old, new);
        }
    }

    /// Update a box's parameters; see [`Self::update_sphere`].
    pub fn update_box(&mut self, handle: ShapeHandle, params: BoxParams) {
        if let Some((old, new)) = self.registry.update_box(handle, params) {
            self.broadphase.update(handle.index(), old, new);
        }
    }

    /// Invalidate and release `handle`'s slot, returning `false` if it was
    /// already invalid (spec §4.5.1 `remove`).
    pub fn remove(&mut self, handle: ShapeHandle) -> bool {
        if !self.registry.is_valid(handle) {
            return false;
        }
        let aabb = self.registry.aabb_at(handle.index());
        self.registry.remove(handle);
        self.broadphase.remove(handle.index(), aabb);
        true
    }

    /// `true` if `handle` refers to a currently-registered shape.
    pub fn is_valid(&self, handle: ShapeHandle) -> bool {
        self.registry.is_valid(handle)
    }

    /// This shape's layer mask, or `None` if `handle` is invalid.
    pub fn layer_mask(&self, handle: ShapeHandle) -> Option<u32> {
        self.registry.layer_mask(handle)
    }

    /// Overwrite this shape's layer mask; `false` if `handle` is invalid.
    pub fn set_layer_mask(&mut self, handle: ShapeHandle, mask: u32) -> bool {
        self.registry.set_layer_mask(handle, mask)
    }

    /// This shape's opaque user data, or `None` if `handle` is invalid.
    pub fn user_data(&self, handle: ShapeHandle) -> Option<i64> {
        self.registry.user_data(handle)
    }

    /// The handle currently occupying a raw registry index, e.g. to
    /// recover a stable handle from a `HitResult::shape_index`.
    pub fn handle_at_index(&self, index: i32) -> Option<ShapeHandle> {
        if index < 0 {
            return None;
        }
        let handle = self.registry.handle_at(index as usize);
        self.registry.is_valid(handle).then_some(handle)
    }

    fn gather(&self, query_aabb: foundry_core::Aabb) -> std::cell::RefMut<'_, Vec<usize>> {
        let mut candidates = self.candidate_scratch.borrow_mut();
        candidates.clear();
        self.broadphase.query(query_aabb, &mut candidates);
        candidates
    }

    /// All shapes containing `point` that pass the mask filter (spec
    /// §4.5.2 `query_point`). Writes up to `out.len()` results, returns
    /// the count written.
    pub fn query_point(&self, point: Vector3, out: &mut [HitResult], include_mask: u32, exclude_mask: u32) -> usize {
        let query_aabb = foundry_core::Aabb::new(point, point);
        let candidates = self.gather(query_aabb);
        let mut count = 0;
        for &index in candidates.iter() {
            if count >= out.len() {
                break;
            }
            if !passes_mask(self.registry.layer_mask_at(index), include_mask, exclude_mask) {
                continue;
            }
            let contains = match self.registry.shape_at(index) {
                ShapeRef::Sphere(s) => narrowphase::point_in_sphere(point, s),
                ShapeRef::Capsule(c) => narrowphase::point_in_capsule(point, c),
                ShapeRef::Cylinder(c) => narrowphase::point_in_cylinder(point, c),
                ShapeRef::Box(b) => narrowphase::point_in_box(point, b),
            };
            if contains {
                out[count] = to_hit_result(index, NarrowHit { distance: 0.0, point, normal: Vector3::UNIT_Y });
                count += 1;
            }
        }
        count
    }

    fn ray_hit_at(&self, index: usize, origin: Vector3, dir: Vector3, max_dist: f32) -> Option<NarrowHit> {
        match self.registry.shape_at(index) {
            ShapeRef::Sphere(s) => narrowphase::ray_sphere(origin, dir, max_dist, s),
            ShapeRef::Capsule(c) => narrowphase::ray_capsule(origin, dir, max_dist, c),
            ShapeRef::Cylinder(c) => narrowphase::ray_cylinder(origin, dir, max_dist, c),
            ShapeRef::Box(b) => narrowphase::ray_box(origin, dir, max_dist, b),
        }
    }

    /// Nearest hit within `query.max_distance`, or `None` (spec §4.5.2
    /// `raycast`). Degenerate (zero-length direction) rays report no hit.
    pub fn raycast(&self, query: RayQuery) -> Option<HitResult> {
        let Some(dir) = query.direction.normalized() else { return None };
        let query_aabb = foundry_core::Aabb::from_points(query.origin, query.origin + dir * query.max_distance);
        let candidates = self.gather(query_aabb);
        let mut best: Option<(usize, NarrowHit)> = None;
        for &index in candidates.iter() {
            if !passes_mask(self.registry.layer_mask_at(index), query.include_mask, query.exclude_mask) {
                continue;
            }
            if let Some(hit) = self.ray_hit_at(index, query.origin, dir, query.max_distance) {
                if best.map(|(_, b)| hit.distance < b.distance).unwrap_or(true) {
                    best = Some((index, hit));
                }
            }
        }
        best.map(|(index, hit)| to_hit_result(index, hit))
    }

    /// Every hit within `query.max_distance`, sorted by ascending distance
    /// (spec §4.5.2 `raycast_all`, §8 "returns results sorted by ascending
    /// distance"). Writes up to `out.len()` results, returns the count.
    pub fn raycast_all(&self, query: RayQuery, out: &mut [HitResult]) -> usize {
        let Some(dir) = query.direction.normalized() else { return 0 };
        let query_aabb = foundry_core::Aabb::from_points(query.origin, query.origin + dir * query.max_distance);
        let candidates = self.gather(query_aabb);
        let mut hits = self.hit_scratch.borrow_mut();
        hits.clear();
        for &index in candidates.iter() {
            if !passes_mask(self.registry.layer_mask_at(index), query.include_mask, query.exclude_mask) {
                continue;
            }
            if let Some(hit) = self.ray_hit_at(index, query.origin, dir, query.max_distance) {
                hits.push(to_hit_result(index, hit));
            }
        }
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        let count = hits.len().min(out.len());
        out[..count].copy_from_slice(&hits[..count]);
        count
    }

    /// Shapes overlapping a query sphere; `distance` in each result is
    /// penetration depth (spec §4.5.2 `query_sphere_overlap`). Writes up
    /// to `out.len()` results, returns the count.
    pub fn query_sphere_overlap(&self, query: SphereOverlapQuery, out: &mut [HitResult]) -> usize {
        let half = Vector3::new(query.radius, query.radius, query.radius);
        let query_aabb = foundry_core::Aabb::from_center_half_extents(query.center, half);
        let candidates = self.gather(query_aabb);
        let mut count = 0;
        for &index in candidates.iter() {
            if count >= out.len() {
                break;
            }
            if !passes_mask(self.registry.layer_mask_at(index), query.include_mask, query.exclude_mask) {
                continue;
            }
            let hit = match self.registry.shape_at(index) {
                ShapeRef::Sphere(s) => narrowphase::sphere_overlap_sphere(query.center, query.radius, s),
                ShapeRef::Capsule(c) => narrowphase::sphere_overlap_capsule(query.center, query.radius, c),
                ShapeRef::Cylinder(c) => narrowphase::sphere_overlap_cylinder(query.center, query.radius, c),
                ShapeRef::Box(b) => narrowphase::sphere_overlap_box(query.center, query.radius, b),
            };
            if let Some(hit) = hit {
                out[count] = to_hit_result(index, hit);
                count += 1;
            }
        }
        count
    }

    /// First shape the swept capsule touches; `distance` is
    /// time-of-impact in `[0, 1]` over the sweep (spec §4.5.2
    /// `capsule_sweep`), approximated by expanding each candidate by the
    /// sweep radius and ray-casting the sweep segment (spec §4.5.4).
    pub fn capsule_sweep(&self, query: CapsuleSweepQuery) -> Option<HitResult> {
        let segment = query.end - query.start;
        let length = segment.length();
        let dir = segment.normalized()?;
        let query_aabb = foundry_core::Aabb::from_points(query.start, query.end).expanded(query.radius);
        let candidates = self.gather(query_aabb);
        let mut best: Option<(usize, NarrowHit)> = None;
        for &index in candidates.iter() {
            if !passes_mask(self.registry.layer_mask_at(index), query.include_mask, query.exclude_mask) {
                continue;
            }
            let hit = match self.registry.shape_at(index) {
                ShapeRef::Sphere(s) => {
                    narrowphase::ray_sphere(query.start, dir, length, &narrowphase::expand_sphere(s, query.radius))
                }
                ShapeRef::Capsule(c) => {
                    narrowphase::ray_capsule(query.start, dir, length, &narrowphase::expand_capsule(c, query.radius))
                }
                ShapeRef::Cylinder(c) => {
                    narrowphase::ray_cylinder(query.start, dir, length, &narrowphase::expand_cylinder(c, query.radius))
                }
                ShapeRef::Box(b) => {
                    narrowphase::ray_box(query.start, dir, length, &narrowphase::expand_box(b, query.radius))
                }
            };
            if let Some(hit) = hit {
                if best.map(|(_, b)| hit.distance < b.distance).unwrap_or(true) {
                    best = Some((index, hit));
                }
            }
        }
        best.map(|(index, hit)| {
            let toi = (hit.distance / length).clamp(0.0, 1.0);
            HitResult { shape_index: index as i32, distance: toi, point: hit.point, normal: hit.normal }
        })
    }

    /// Shapes intersecting the quad swept by a blade's four corners (spec
    /// §4.5.2 `query_slash`). Writes up to `out.len()` results, returns
    /// the count.
    pub fn query_slash(&self, query: SlashQuery, out: &mut [HitResult]) -> usize {
        let candidates = self.gather(query.aabb());
        let mut count = 0;
        for &index in candidates.iter() {
            if count >= out.len() {
                break;
            }
            if !passes_mask(self.registry.layer_mask_at(index), query.include_mask, query.exclude_mask) {
                continue;
            }
            let hit = match self.registry.shape_at(index) {
                ShapeRef::Sphere(s) => narrowphase::slash_sphere(query.corners, s),
                ShapeRef::Capsule(c) => narrowphase::slash_capsule(query.corners, c),
                ShapeRef::Cylinder(c) => narrowphase::slash_cylinder(query.corners, c),
                ShapeRef::Box(b) => narrowphase::slash_box(query.corners, b),
            };
            if let Some(hit) = hit {
                out[count] = to_hit_result(index, hit);
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SpatialWorld {
        SpatialWorld::new(SpatialWorldConfig::default()).unwrap()
    }

    #[test]
    fn raycast_hits_sphere_at_expected_distance() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 1.0 }, true, 0, 1);
        let hit = w
            .raycast(RayQuery::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0))
            .unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-3);
        assert!((hit.point - Vector3::new(0.0, 0.0, 1.0)).length() < 1e-3);
        assert!((hit.normal - Vector3::new(0.0, 0.0, 1.0)).length() < 1e-3);
    }

    #[test]
    fn removed_shape_is_no_longer_hit() {
        let mut w = world();
        let handle = w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 1.0 }, true, 0, 1);
        assert!(w.remove(handle));
        let hit = w.raycast(RayQuery::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0));
        assert!(hit.is_none());
    }

    #[test]
    fn sphere_overlap_reports_penetration_depth() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 1.0 }, true, 0, 1);
        let mut out = [HitResult::NONE; 4];
        let count = w.query_sphere_overlap(SphereOverlapQuery::new(Vector3::new(1.5, 0.0, 0.0), 1.0), &mut out);
        assert_eq!(count, 1);
        assert!((out[0].distance - 0.5).abs() < 1e-3);
    }

    #[test]
    fn capsule_sweep_time_of_impact_matches_expected() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::new(0.0, 0.0, 5.0), radius: 1.0 }, true, 0, 1);
        let hit = w
            .capsule_sweep(CapsuleSweepQuery::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 10.0), 0.5))
            .unwrap();
        assert!((hit.distance - 0.35).abs() < 1e-3);
    }

    #[test]
    fn layer_mask_filters_out_non_matching_shapes() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 1.0 }, true, 0, 0x02);
        let mut ray = RayQuery::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0);
        ray.include_mask = 0x01;
        assert!(w.raycast(ray).is_none());
    }

    #[test]
    fn raycast_all_sorts_by_ascending_distance() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::new(0.0, 0.0, 5.0), radius: 1.0 }, true, 0, 1);
        w.add_sphere(SphereParams { center: Vector3::new(0.0, 0.0, -5.0), radius: 1.0 }, true, 0, 1);
        let mut out = [HitResult::NONE; 8];
        let count = w.raycast_all(RayQuery::new(Vector3::new(0.0, 0.0, 20.0), Vector3::new(0.0, 0.0, -1.0), 100.0), &mut out);
        assert_eq!(count, 2);
        assert!(out[0].distance < out[1].distance);
    }

    #[test]
    fn query_point_finds_containing_shape() {
        let mut w = world();
        w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 2.0 }, true, 0, 1);
        let mut out = [HitResult::NONE; 4];
        let count = w.query_point(Vector3::new(1.0, 0.0, 0.0), &mut out, DEFAULT_INCLUDE_MASK, DEFAULT_EXCLUDE_MASK);
        assert_eq!(count, 1);
    }

    #[test]
    fn cross_strategy_candidate_sets_agree_on_final_hits() {
        for strategy in [
            BroadPhaseKind::Bvh,
            BroadPhaseKind::Dbvt { margin: 0.1 },
            BroadPhaseKind::SpatialHash { cell_size: 4.0 },
            BroadPhaseKind::GridSap { cell_size: 4.0, axis: crate::config::GridSapAxis::Xz },
        ] {
            let cfg = SpatialWorldConfig { strategy, ..Default::default() };
            let mut w = SpatialWorld::new(cfg).unwrap();
            w.add_sphere(SphereParams { center: Vector3::ZERO, radius: 1.0 }, true, 0, 1);
            let hit = w
                .raycast(RayQuery::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0))
                .unwrap();
            assert!((hit.distance - 9.0).abs() < 1e-3, "strategy produced a different hit set");
        }
    }
}
