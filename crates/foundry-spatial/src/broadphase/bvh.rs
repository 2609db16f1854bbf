//! SAH-balanced dynamic AABB tree with tight (unfattened) leaves — the
//! default broad-phase (spec §4.5.3 "BVH ... Default").

use std::any::Any;

use foundry_core::Aabb;

use super::dynamic_tree::DynamicTree;
use super::BroadPhase;

/// Tight-leaf dynamic AABB tree. O(log n) insert/remove/update/query, no
/// world bounds required.
pub struct Bvh {
    tree: DynamicTree,
}

impl Bvh {
    /// A new, empty tree.
    pub fn new() -> Self {
        Bvh { tree: DynamicTree::new(0.0) }
    }
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadPhase for Bvh {
    fn strategy_name(&self) -> &'static str {
        "BVH"
    }

    fn insert(&mut self, index: usize, aabb: Aabb) {
        self.tree.insert(index, aabb);
    }

    fn remove(&mut self, index: usize, _aabb: Aabb) {
        self.tree.remove(index);
    }

    fn update(&mut self, index: usize, _old_aabb: Aabb, new_aabb: Aabb) {
        self.tree.update(index, new_aabb);
    }

    fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        self.tree.query(query_aabb, out);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_core::Vector3;

    #[test]
    fn round_trip_insert_query_remove() {
        let mut bvh = Bvh::new();
        let aabb = Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0));
        bvh.insert(7, aabb);
        let mut out = Vec::new();
        bvh.query(aabb, &mut out);
        assert_eq!(out, vec![7]);
        bvh.remove(7, aabb);
        out.clear();
        bvh.query(aabb, &mut out);
        assert!(out.is_empty());
    }
}
