//! Shape parameter bundles and the handle type identifying a registered
//! shape (spec §3 "Shape types", §4.6).

use foundry_core::Vector3;

/// A sphere: `center` plus `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// World-space center.
    pub center: Vector3,
    /// Radius; must be finite and non-negative.
    pub radius: f32,
}

/// A capsule: a line segment from `start` to `end` swept by `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleParams {
    /// One end of the capsule's medial segment.
    pub start: Vector3,
    /// The other end of the capsule's medial segment.
    pub end: Vector3,
    /// Sweep radius.
    pub radius: f32,
}

/// An upright cylinder: a vertical segment of `2 * half_height` centered at
/// `center`, swept by `radius`. The cylinder's axis is always world-`Y`;
/// tilted cylinders are out of scope (not exercised by the spec's testable
/// properties, and every other primitive here is likewise axis-aligned or
/// yaw-only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    /// World-space center of the cylinder's medial segment.
    pub center: Vector3,
    /// Half the cylinder's total height along `Y`.
    pub half_height: f32,
    /// Radius of the circular cross-section.
    pub radius: f32,
}

/// An oriented box: `center` plus per-axis `half_extents`, rotated by `yaw`
/// radians about world-`Y` (spec §4.5.4: "boxes with yaw transform the
/// query into box-local space").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    /// World-space center.
    pub center: Vector3,
    /// Half-width along each local axis before rotation.
    pub half_extents: Vector3,
    /// Rotation about world-`Y`, in radians.
    pub yaw: f32,
}

/// Discriminant stored in the registry's `type_tag` array (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// [`SphereParams`].
    Sphere,
    /// [`CapsuleParams`].
    Capsule,
    /// [`CylinderParams`].
    Cylinder,
    /// [`BoxParams`].
    Box,
}

/// A stable, non-owning reference to a registered shape: `(index,
/// generation)` (spec §4.6). `generation == 0` is never produced by a
/// successful `add_*` call and is reserved for the invalid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle {
    index: usize,
    generation: u32,
}

impl ShapeHandle {
    /// The canonical invalid handle: index `0`, generation `0`.
    pub const INVALID: ShapeHandle = ShapeHandle { index: 0, generation: 0 };

    pub(crate) fn new(index: usize, generation: u32) -> Self {
        ShapeHandle { index, generation }
    }

    /// Raw slot index within the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation recorded at the time this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
