//! Bounded octree requiring fixed world extents, good for sparse
//! distributions (spec §4.5.3 `Octree`).

use std::any::Any;
use std::collections::HashMap;

use foundry_core::{Aabb, Vector3};

use super::BroadPhase;

struct OctreeNode {
    bounds: Aabb,
    children: Option<[usize; 8]>,
    shapes: Vec<(usize, Aabb)>,
}

fn child_bounds(parent: Aabb, octant: usize) -> Aabb {
    let center = parent.center();
    let half = parent.half_extents() * 0.5;
    let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
    let offset = Vector3::new(sign(1) * half.x, sign(2) * half.y, sign(4) * half.z);
    Aabb::from_center_half_extents(center + offset, half)
}

fn aabb_contains(outer: Aabb, inner: Aabb) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.min.z <= inner.min.z
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
        && outer.max.z >= inner.max.z
}

/// Bounded, statically-subdivided octree. A shape is stored at the
/// deepest node whose bounds fully contain its AABB; shapes straddling a
/// split plane are stored at the ancestor that contains them instead of
/// being split or duplicated.
pub struct Octree {
    nodes: Vec<OctreeNode>,
    max_depth: u32,
    location: HashMap<usize, usize>,
}

impl Octree {
    /// Construct a bounded octree covering `world_bounds`, subdividing up
    /// to `max_depth` levels deep.
    pub fn new(world_bounds: Aabb, max_depth: u32) -> Self {
        let root = OctreeNode { bounds: world_bounds, children: None, shapes: Vec::new() };
        Octree { nodes: vec![root], max_depth, location: HashMap::new() }
    }

    fn ensure_children(&mut self, node_id: usize) -> [usize; 8] {
        if let Some(children) = self.nodes[node_id].children {
            return children;
        }
        let parent_bounds = self.nodes[node_id].bounds;
        let mut children = [0usize; 8];
        for (octant, slot) in children.iter_mut().enumerate() {
            let bounds = child_bounds(parent_bounds, octant);
            self.nodes.push(OctreeNode { bounds, children: None, shapes: Vec::new() });
            *slot = self.nodes.len() - 1;
        }
        self.nodes[node_id].children = Some(children);
        children
    }

    fn descend(&mut self, node_id: usize, depth: u32, aabb: Aabb) -> usize {
        if depth >= self.max_depth {
            return node_id;
        }
        let parent_bounds = self.nodes[node_id].bounds;
        let mut fitting_child = None;
        for octant in 0..8 {
            let bounds = child_bounds(parent_bounds, octant);
            if aabb_contains(bounds, aabb) {
                fitting_child = Some(octant);
                break;
            }
        }
        match fitting_child {
            Some(octant) => {
                let children = self.ensure_children(node_id);
                self.descend(children[octant], depth + 1, aabb)
            }
            None => node_id,
        }
    }

    fn collect(&self, node_id: usize, query_aabb: Aabb, out: &mut Vec<usize>) {
        let node = &self.nodes[node_id];
        if !node.bounds.overlaps(query_aabb) {
            return;
        }
        for &(index, aabb) in &node.shapes {
            if aabb.overlaps(query_aabb) {
                out.push(index);
            }
        }
        if let Some(children) = node.children {
            for child in children {
                self.collect(child, query_aabb, out);
            }
        }
    }
}

impl BroadPhase for Octree {
    fn strategy_name(&self) -> &'static str {
        "Octree"
    }

    fn insert(&mut self, index: usize, aabb: Aabb) {
        let node_id = self.descend(0, 0, aabb);
        self.nodes[node_id].shapes.push((index, aabb));
        self.location.insert(index, node_id);
    }

    fn remove(&mut self, index: usize, _aabb: Aabb) {
        let Some(node_id) = self.location.remove(&index) else { return };
        let shapes = &mut self.nodes[node_id].shapes;
        if let Some(pos) = shapes.iter().position(|&(i, _)| i == index) {
            shapes.swap_remove(pos);
        }
    }

    fn update(&mut self, index: usize, old_aabb: Aabb, new_aabb: Aabb) {
        self.remove(index, old_aabb);
        self.insert(index, new_aabb);
    }

    fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        self.collect(0, query_aabb, out);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Aabb {
        Aabb::new(Vector3::new(-64.0, -64.0, -64.0), Vector3::new(64.0, 64.0, 64.0))
    }

    fn aabb_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vector3::new(x, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn query_finds_overlapping_shape_only() {
        let mut tree = Octree::new(world(), 5);
        tree.insert(0, aabb_at(0.0));
        tree.insert(1, aabb_at(40.0));
        let mut out = Vec::new();
        tree.query(aabb_at(0.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn shape_spanning_split_plane_still_found() {
        let mut tree = Octree::new(world(), 5);
        // Straddles the root's center split plane at x=0.
        let straddling = Aabb::from_center_half_extents(Vector3::ZERO, Vector3::new(50.0, 1.0, 1.0));
        tree.insert(0, straddling);
        let mut out = Vec::new();
        tree.query(aabb_at(0.0), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn remove_then_query_returns_nothing() {
        let mut tree = Octree::new(world(), 5);
        let aabb = aabb_at(0.0);
        tree.insert(7, aabb);
        tree.remove(7, aabb);
        let mut out = Vec::new();
        tree.query(aabb, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn update_relocates_shape_to_new_node() {
        let mut tree = Octree::new(world(), 5);
        let before = aabb_at(0.0);
        let after = aabb_at(40.0);
        tree.insert(0, before);
        tree.update(0, before, after);
        let mut out = Vec::new();
        tree.query(before, &mut out);
        assert!(out.is_empty());
        tree.query(after, &mut out);
        assert_eq!(out, vec![0]);
    }
}
