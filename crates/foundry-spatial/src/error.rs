//! Error types for spatial-world construction and configuration.
//!
//! Per-operation failures (invalid handle, degenerate geometry, buffer
//! exhaustion) are signaled as `bool`/`Option`/filled-buffer-length per
//! spec §7's error table, never as `SpatialError`; this type covers only
//! construction-time misconfiguration.

use std::error::Error;
use std::fmt;

/// Failure conditions raised while constructing a [`crate::world::SpatialWorld`]
/// or validating a [`crate::config::SpatialWorldConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialError {
    /// The chosen broad-phase strategy requires bounded world extents
    /// (`Octree`, `MBP`) but `world_bounds` was not supplied.
    WorldBoundsRequired {
        /// Name of the strategy that requires bounds.
        strategy: &'static str,
    },
    /// A grid-based strategy (`MBP`, `GridSAP`, `SpatialHash`) was
    /// configured with a non-positive cell size.
    InvalidCellSize {
        /// The offending value.
        cell_size: f32,
    },
    /// The candidate scratch buffer capacity was configured as zero.
    InvalidCandidateCapacity,
}

impl fmt::Display for SpatialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialError::WorldBoundsRequired { strategy } => {
                write!(f, "broad-phase strategy {strategy} requires world_bounds to be set")
            }
            SpatialError::InvalidCellSize { cell_size } => {
                write!(f, "grid cell size must be positive, got {cell_size}")
            }
            SpatialError::InvalidCandidateCapacity => {
                write!(f, "candidate buffer capacity must be non-zero")
            }
        }
    }
}

impl Error for SpatialError {}
