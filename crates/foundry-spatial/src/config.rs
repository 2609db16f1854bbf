//! World-construction-time configuration (spec §4.5.3 "Selection is made at
//! world construction; the rest of the system is strategy-agnostic"),
//! grounded on `murk_engine::config::{WorldConfig, BackoffConfig}`'s
//! plain-struct-with-`Default`-and-`validate()` shape.

use foundry_core::Aabb;

use crate::error::SpatialError;

/// Primary sweep axis for [`BroadPhaseKind::GridSap`] (spec §4.5.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSapAxis {
    /// Bucket by `X` only.
    X,
    /// Bucket by `Z` only.
    Z,
    /// Bucket by both `X` and `Z`.
    Xz,
}

/// Which pluggable broad-phase strategy a [`crate::world::SpatialWorld`]
/// uses (spec §4.5.3). The choice is fixed for the world's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadPhaseKind {
    /// SAH-style dynamic AABB tree, tight-fitting leaves. Default.
    Bvh,
    /// Dynamic AABB tree with fattened leaves so small moves are O(1).
    Dbvt {
        /// How far leaf AABBs are fattened past the shape's tight AABB.
        margin: f32,
    },
    /// Bounded loose octree. Requires `world_bounds`.
    Octree {
        /// Maximum subdivision depth.
        max_depth: u32,
    },
    /// Multi-box pruning: a fixed grid of regions, each sweep-and-prune
    /// over the shapes overlapping it. Requires `world_bounds`.
    Mbp {
        /// Region edge length.
        region_size: f32,
    },
    /// Uniform grid with sweep-and-prune per cell along a configurable
    /// axis/axes.
    GridSap {
        /// Grid cell edge length.
        cell_size: f32,
        /// Which axis (or axes) the grid buckets on.
        axis: GridSapAxis,
    },
    /// Uniform-cell spatial hash.
    SpatialHash {
        /// Grid cell edge length.
        cell_size: f32,
    },
}

impl Default for BroadPhaseKind {
    fn default() -> Self {
        BroadPhaseKind::Bvh
    }
}

/// Construction-time configuration for a [`crate::world::SpatialWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialWorldConfig {
    /// Which broad-phase strategy to construct.
    pub strategy: BroadPhaseKind,
    /// World extents. Required by `Octree` and `Mbp`; optional (ignored)
    /// for the other strategies.
    pub world_bounds: Option<Aabb>,
    /// Stack-allocated candidate buffer capacity used by every query (spec
    /// §4.5.2 "default ~256"). Grows past this only as a scratch-buffer
    /// implementation detail (resolved Open Question #5); this value is
    /// the starting capacity.
    pub candidate_buffer_capacity: usize,
}

impl Default for SpatialWorldConfig {
    fn default() -> Self {
        SpatialWorldConfig {
            strategy: BroadPhaseKind::default(),
            world_bounds: None,
            candidate_buffer_capacity: 256,
        }
    }
}

impl SpatialWorldConfig {
    /// Check internal consistency: bounded strategies have bounds, grid
    /// cell sizes are positive, and the candidate buffer isn't degenerate.
    pub fn validate(&self) -> Result<(), SpatialError> {
        match self.strategy {
            BroadPhaseKind::Octree { .. } if self.world_bounds.is_none() => {
                return Err(SpatialError::WorldBoundsRequired { strategy: "Octree" })
            }
            BroadPhaseKind::Mbp { region_size } => {
                if self.world_bounds.is_none() {
                    return Err(SpatialError::WorldBoundsRequired { strategy: "MBP" });
                }
                if region_size <= 0.0 {
                    return Err(SpatialError::InvalidCellSize { cell_size: region_size });
                }
            }
            BroadPhaseKind::GridSap { cell_size, .. } | BroadPhaseKind::SpatialHash { cell_size } => {
                if cell_size <= 0.0 {
                    return Err(SpatialError::InvalidCellSize { cell_size });
                }
            }
            _ => {}
        }
        if self.candidate_buffer_capacity == 0 {
            return Err(SpatialError::InvalidCandidateCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SpatialWorldConfig::default().validate().is_ok());
    }

    #[test]
    fn octree_without_bounds_is_rejected() {
        let cfg = SpatialWorldConfig {
            strategy: BroadPhaseKind::Octree { max_depth: 6 },
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(SpatialError::WorldBoundsRequired { .. })));
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let cfg = SpatialWorldConfig {
            strategy: BroadPhaseKind::SpatialHash { cell_size: 0.0 },
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(SpatialError::InvalidCellSize { .. })));
    }
}
