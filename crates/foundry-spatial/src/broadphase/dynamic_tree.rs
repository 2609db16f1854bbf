//! Insertion-based dynamic AABB tree, shared by [`super::Bvh`] (`margin ==
//! 0.0`, tight leaves) and [`super::Dbvt`] (`margin > 0.0`, fattened leaves
//! absorbing small moves as a no-op) — the same Box2D `b2DynamicTree`
//! sibling-selection approach, generalized over the margin so one core
//! backs both strategies the spec lists as variations on one data
//! structure (spec §4.5.3 "BVH ... DBVT ... with a margin").
//!
//! Sibling selection uses [`Aabb::surface_area`] as a one-step cost
//! estimate rather than Box2D's full branch-and-bound descent with
//! subsequent rotation-rebalancing; this keeps insert/remove simple and
//! correct at the cost of an occasionally deeper tree, which only affects
//! query constant factors, not candidate-set correctness.

use std::cell::RefCell;
use std::collections::HashMap;

use foundry_core::{Aabb, Vector3};

#[derive(Debug, Clone, Copy)]
struct TreeNode {
    aabb: Aabb,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    shape_index: Option<usize>,
}

impl TreeNode {
    fn is_leaf(&self) -> bool {
        self.shape_index.is_some()
    }
}

pub(crate) struct DynamicTree {
    nodes: Vec<TreeNode>,
    free_list: Vec<usize>,
    root: Option<usize>,
    margin: f32,
    leaf_of: HashMap<usize, usize>,
    scratch: RefCell<Vec<usize>>,
}

fn aabb_contains(outer: Aabb, inner: Aabb) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.min.z <= inner.min.z
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
        && outer.max.z >= inner.max.z
}

impl DynamicTree {
    pub(crate) fn new(margin: f32) -> Self {
        DynamicTree {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: None,
            margin,
            leaf_of: HashMap::new(),
            scratch: RefCell::new(Vec::new()),
        }
    }

    fn allocate(&mut self, aabb: Aabb, shape_index: Option<usize>) -> usize {
        let node = TreeNode { aabb, parent: None, left: None, right: None, shape_index };
        if let Some(id) = self.free_list.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn free(&mut self, id: usize) {
        self.free_list.push(id);
    }

    fn refit_upward(&mut self, mut id: usize) {
        loop {
            let node = self.nodes[id];
            debug_assert!(!node.is_leaf());
            let left = self.nodes[node.left.expect("internal node has left child")].aabb;
            let right = self.nodes[node.right.expect("internal node has right child")].aabb;
            self.nodes[id].aabb = left.merge(right);
            match node.parent {
                Some(p) => id = p,
                None => break,
            }
        }
    }

    fn descend_cost(&self, node_id: usize, leaf_aabb: Aabb) -> f32 {
        self.nodes[node_id].aabb.merge(leaf_aabb).surface_area()
    }

    fn best_sibling(&self, leaf_aabb: Aabb) -> usize {
        let mut index = self.root.expect("tree is non-empty");
        loop {
            let node = self.nodes[index];
            if node.is_leaf() {
                return index;
            }
            let left = node.left.expect("internal node has left child");
            let right = node.right.expect("internal node has right child");
            let own_area = node.aabb.surface_area();
            let combined_area = node.aabb.merge(leaf_aabb).surface_area();
            let direct_cost = combined_area;
            let inherited = combined_area - own_area;
            let left_cost = self.descend_cost(left, leaf_aabb) + inherited;
            let right_cost = self.descend_cost(right, leaf_aabb) + inherited;
            if direct_cost <= left_cost && direct_cost <= right_cost {
                return index;
            }
            index = if left_cost < right_cost { left } else { right };
        }
    }

    pub(crate) fn insert(&mut self, shape_index: usize, aabb: Aabb) {
        let fat_aabb = aabb.expanded(self.margin);
        let leaf = self.allocate(fat_aabb, Some(shape_index));
        self.leaf_of.insert(shape_index, leaf);

        let sibling = match self.root {
            None => {
                self.root = Some(leaf);
                return;
            }
            Some(_) => self.best_sibling(fat_aabb),
        };

        let old_parent = self.nodes[sibling].parent;
        let new_parent_aabb = self.nodes[sibling].aabb.merge(fat_aabb);
        let new_parent = self.allocate(new_parent_aabb, None);
        self.nodes[new_parent].parent = old_parent;
        self.nodes[new_parent].left = Some(sibling);
        self.nodes[new_parent].right = Some(leaf);
        self.nodes[sibling].parent = Some(new_parent);
        self.nodes[leaf].parent = Some(new_parent);

        match old_parent {
            None => self.root = Some(new_parent),
            Some(p) => {
                if self.nodes[p].left == Some(sibling) {
                    self.nodes[p].left = Some(new_parent);
                } else {
                    self.nodes[p].right = Some(new_parent);
                }
                self.refit_upward(p);
            }
        }
    }

    pub(crate) fn remove(&mut self, shape_index: usize) {
        let Some(leaf) = self.leaf_of.remove(&shape_index) else { return };
        let parent = self.nodes[leaf].parent;
        self.free(leaf);

        let Some(parent) = parent else {
            self.root = None;
            return;
        };
        let grandparent = self.nodes[parent].parent;
        let sibling = if self.nodes[parent].left == Some(leaf) {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        }
        .expect("parent of a leaf always has two children");

        match grandparent {
            None => {
                self.root = Some(sibling);
                self.nodes[sibling].parent = None;
            }
            Some(gp) => {
                if self.nodes[gp].left == Some(parent) {
                    self.nodes[gp].left = Some(sibling);
                } else {
                    self.nodes[gp].right = Some(sibling);
                }
                self.nodes[sibling].parent = Some(gp);
                self.refit_upward(gp);
            }
        }
        self.free(parent);
    }

    /// Returns `true` if the shape was relinked (its leaf moved in the
    /// tree), `false` if the margin absorbed the move as a no-op.
    pub(crate) fn update(&mut self, shape_index: usize, new_aabb: Aabb) -> bool {
        let Some(&leaf) = self.leaf_of.get(&shape_index) else { return false };
        if aabb_contains(self.nodes[leaf].aabb, new_aabb) {
            return false;
        }
        self.remove(shape_index);
        self.insert(shape_index, new_aabb);
        true
    }

    pub(crate) fn query(&self, query_aabb: Aabb, out: &mut Vec<usize>) {
        let Some(root) = self.root else { return };
        let mut stack = self.scratch.borrow_mut();
        stack.clear();
        stack.push(root);
        while let Some(id) = stack.pop() {
            let node = self.nodes[id];
            if !node.aabb.overlaps(query_aabb) {
                continue;
            }
            match node.shape_index {
                Some(index) => out.push(index),
                None => {
                    if let Some(l) = node.left {
                        stack.push(l);
                    }
                    if let Some(r) = node.right {
                        stack.push(r);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aabb_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vector3::new(x, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn query_finds_overlapping_leaves_only() {
        let mut tree = DynamicTree::new(0.0);
        tree.insert(0, aabb_at(0.0));
        tree.insert(1, aabb_at(10.0));
        tree.insert(2, aabb_at(20.0));
        let mut out = Vec::new();
        tree.query(aabb_at(10.0), &mut out);
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn remove_then_query_no_longer_returns_shape() {
        let mut tree = DynamicTree::new(0.0);
        tree.insert(0, aabb_at(0.0));
        tree.insert(1, aabb_at(0.0));
        tree.remove(0);
        let mut out = Vec::new();
        tree.query(aabb_at(0.0), &mut out);
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn margin_absorbs_small_move_without_relinking() {
        let mut tree = DynamicTree::new(1.0);
        tree.insert(0, aabb_at(0.0));
        let moved = aabb_at(0.2);
        let relinked = tree.update(0, moved);
        assert!(!relinked);
        let mut out = Vec::new();
        tree.query(moved, &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn large_move_past_margin_relinks() {
        let mut tree = DynamicTree::new(0.1);
        tree.insert(0, aabb_at(0.0));
        tree.insert(1, aabb_at(100.0));
        let relinked = tree.update(0, aabb_at(100.0));
        assert!(relinked);
        let mut out = Vec::new();
        tree.query(aabb_at(100.0), &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }
}
