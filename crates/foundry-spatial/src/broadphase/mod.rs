//! The pluggable broad-phase seam (spec §4.5.3): one `BroadPhase` trait,
//! six implementations behind it, chosen once at world construction.
//!
//! Grounded on `murk_space::space::Space`: an `Any`-bound trait plus a
//! `downcast_ref` inherent impl on `dyn BroadPhase`, the same "opt-in
//! specialization" shape the teacher uses so a caller holding `&dyn
//! BroadPhase` can still reach a concrete backend's extra methods when it
//! knows which one it built.

use std::any::Any;

use foundry_core::Aabb;

mod dynamic_tree;
mod grid_common;

mod bvh;
mod dbvt;
mod gridsap;
mod mbp;
mod octree;
mod spatialhash;

pub use bvh::Bvh;
pub use dbvt::Dbvt;
pub use gridsap::GridSap;
pub use mbp::Mbp;
pub use octree::Octree;
pub use spatialhash::SpatialHash;

/// Coarse spatial culling: given a shape's AABB, find every other shape
/// whose AABB might overlap it, leaving exact geometric tests to the
/// narrow-phase (spec §4.5 "two-phase spatial query engine").
///
/// Implementations track only raw registry indices and AABBs; they know
/// nothing about shape kinds, layer masks, or handles (spec §4.6 — those
/// live in the [`crate::registry::ShapeRegistry`]).
pub trait BroadPhase: Any {
    /// Name for diagnostics (`"BVH"`, `"DBVT"`, …).
    fn strategy_name(&self) -> &'static str;

    /// Begin tracking `index` at `aabb`.
    fn insert(&mut self, index: usize, aabb: Aabb);

    /// Stop tracking `index`, previously inserted at `aabb`.
    fn remove(&mut self, index: usize, aabb: Aabb);

    /// `index` moved from `old_aabb` to `new_aabb`. Implementations may
    /// absorb small moves as a no-op (DBVT's margin) or always relink.
    fn update(&mut self, index: usize, old_aabb: Aabb, new_aabb: Aabb);

    /// Append every tracked index whose AABB overlaps `query_aabb` to
    /// `out`. `out` is not cleared first; callers that need a fresh set
    /// must clear it themselves. No duplicate index is ever pushed twice
    /// for the same call.
    fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>);

    /// Type-erased view of `self`, backing [`downcast_ref`](dyn BroadPhase::downcast_ref).
    fn as_any(&self) -> &dyn Any;
}

impl dyn BroadPhase {
    /// Downcast to a concrete broad-phase backend, for callers that know
    /// which strategy a [`crate::world::SpatialWorld`] was built with.
    pub fn downcast_ref<T: BroadPhase>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
