//! Two-phase spatial query engine: a Structure-of-Arrays shape registry, a
//! pluggable broad-phase strategy, and pure-function narrow-phase geometry.
//!
//! A [`SpatialWorld`] owns every registered shape and answers point, ray,
//! sphere-overlap, capsule-sweep, and slash queries by first gathering
//! broad-phase candidates (coarse AABB overlap against whichever strategy
//! the world was configured with) and then running an exact or
//! closed-form-approximate narrow-phase test per candidate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod broadphase;
pub mod config;
pub mod error;
pub mod narrowphase;
pub mod registry;
pub mod shape;
pub mod world;

pub use broadphase::{Bvh, BroadPhase, Dbvt, GridSap, Mbp, Octree, SpatialHash};
pub use config::{BroadPhaseKind, GridSapAxis, SpatialWorldConfig};
pub use error::SpatialError;
pub use registry::ShapeRef;
pub use shape::{BoxParams, CapsuleParams, CylinderParams, ShapeHandle, ShapeKind, SphereParams};
pub use world::{
    CapsuleSweepQuery, HitResult, RayQuery, SlashQuery, SpatialWorld, SphereOverlapQuery,
    DEFAULT_EXCLUDE_MASK, DEFAULT_INCLUDE_MASK,
};
