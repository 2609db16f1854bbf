//! Dynamic AABB tree with fattened ("loose") leaves (spec §4.5.3 "Small
//! moves are O(1); larger ones relink").

use std::any::Any;

use foundry_core::Aabb;

use super::dynamic_tree::DynamicTree;
use super::BroadPhase;

/// Default fattening margin applied to every leaf's tight AABB.
pub const DEFAULT_MARGIN: f32 = 0.1;

/// Margin-fattened dynamic AABB tree. A moving shape whose new AABB is
/// still contained by its fattened leaf AABB costs nothing; only a move
/// past the margin triggers a relink.
pub struct Dbvt {
    tree: DynamicTree,
}

impl Dbvt {
    /// A new, empty tree fattening leaves by `margin`.
    pub fn new(margin: f32) -> Self {
        Dbvt { tree: DynamicTree::new(margin) }
    }
}

impl Default for Dbvt {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl BroadPhase for Dbvt {
    fn strategy_name(&self) -> &'static str {
        "DBVT"
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
