//! SoA shape storage (spec §4.6): one typed pool per shape variant plus
//! parallel `aabb`/`type_tag`/`user_data`/`layer_mask`/`is_static`/
//! `generation` arrays indexed by a single, uniform shape index. Grounded
//! on the same free-list-reuse shape `foundry_arena::arena::Arena` uses,
//! generalized from one homogeneous pool to four heterogeneous ones behind
//! a shared index space — the registry equivalent of `murk-arena`'s
//! `SparseSlab` pattern applied to a tagged union of pools instead of one.

use foundry_core::Aabb;

use crate::shape::{BoxParams, CapsuleParams, CylinderParams, ShapeHandle, ShapeKind, SphereParams};

/// Borrowed view of one registered shape's concrete parameters, used by
/// the narrow-phase to dispatch on shape kind without an allocation.
#[derive(Debug, Clone, Copy)]
pub enum ShapeRef<'a> {
    /// See [`SphereParams`].
    Sphere(&'a SphereParams),
    /// See [`CapsuleParams`].
    Capsule(&'a CapsuleParams),
    /// See [`CylinderParams`].
    Cylinder(&'a CylinderParams),
    /// See [`BoxParams`].
    Box(&'a BoxParams),
}

/// Owns every registered shape's data in Structure-of-Arrays form.
pub struct ShapeRegistry {
    spheres: Vec<SphereParams>,
    capsules: Vec<CapsuleParams>,
    cylinders: Vec<CylinderParams>,
    boxes: Vec<BoxParams>,
    /// Discriminant for slot `i`; meaningless if `generation[i] == 0`.
    type_tag: Vec<ShapeKind>,
    /// Index of slot `i`'s data within its kind's pool above.
    pool_index: Vec<usize>,
    aabb: Vec<Aabb>,
    user_data: Vec<i64>,
    layer_mask: Vec<u32>,
    is_static: Vec<bool>,
    generation: Vec<u32>,
    free_list: Vec<usize>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ShapeRegistry {
            spheres: Vec::new(),
            capsules: Vec::new(),
            cylinders: Vec::new(),
            boxes: Vec::new(),
            type_tag: Vec::new(),
            pool_index: Vec::new(),
            aabb: Vec::new(),
            user_data: Vec::new(),
            layer_mask: Vec::new(),
            is_static: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
        }
    }

    fn allocate_slot(&mut self) -> usize {
        if let Some(index) = self.free_list.pop() {
            return index;
        }
        let index = self.generation.len();
        self.type_tag.push(ShapeKind::Sphere);
        self.pool_index.push(0);
        self.aabb.push(Aabb::new(Default::default(), Default::default()));
        self.user_data.push(0);
        self.layer_mask.push(0);
        self.is_static.push(false);
        self.generation.push(0);
        index
    }

    fn insert(
        &mut self,
        kind: ShapeKind,
        pool_index: usize,
        aabb: Aabb,
        is_static: bool,
        user_data: i64,
        layer_mask: u32,
    ) -> ShapeHandle {
        let index = self.allocate_slot();
        self.type_tag[index] = kind;
        self.pool_index[index] = pool_index;
        self.aabb[index] = aabb;
        self.user_data[index] = user_data;
        self.layer_mask[index] = layer_mask;
        self.is_static[index] = is_static;
        let generation = self.generation[index].wrapping_add(1).max(1);
        self.generation[index] = generation;
        ShapeHandle::new(index, generation)
    }

    /// Register a sphere, returning its handle and initial AABB.
    pub fn insert_sphere(
        &mut self,
        params: SphereParams,
        is_static: bool,
        user_data: i64,
        layer_mask: u32,
    ) -> (ShapeHandle, Aabb) {
        let pool_index = self.spheres.len();
        self.spheres.push(params);
        let aabb = sphere_aabb(&params);
        (self.insert(ShapeKind::Sphere, pool_index, aabb, is_static, user_data, layer_mask), aabb)
    }

    /// Register a capsule, returning its handle and initial AABB.
    pub fn insert_capsule(
        &mut self,
        params: CapsuleParams,
        is_static: bool,
        user_data: i64,
        layer_mask: u32,
    ) -> (ShapeHandle, Aabb) {
        let pool_index = self.capsules.len();
        self.capsules.push(params);
        let aabb = capsule_aabb(&params);
        (self.insert(ShapeKind::Capsule, pool_index, aabb, is_static, user_data, layer_mask), aabb)
    }

    /// Register a cylinder, returning its handle and initial AABB.
    pub fn insert_cylinder(
        &mut self,
        params: CylinderParams,
        is_static: bool,
        user_data: i64,
        layer_mask: u32,
    ) -> (ShapeHandle, Aabb) {
        let pool_index = self.cylinders.len();
        self.cylinders.push(params);
        let aabb = cylinder_aabb(&params);
        (self.insert(ShapeKind::Cylinder, pool_index, aabb, is_static, user_data, layer_mask), aabb)
    }

    /// Register a box, returning its handle and initial AABB.
    pub fn insert_box(
        &mut self,
        params: BoxParams,
        is_static: bool,
        user_data: i64,
        layer_mask: u32,
    ) -> (ShapeHandle, Aabb) {
        let pool_index = self.boxes.len();
        self.boxes.push(params);
        let aabb = box_aabb(&params);
        (self.insert(ShapeKind::Box, pool_index, aabb, is_static, user_data, layer_mask), aabb)
    }

    /// `true` if `handle` refers to a currently-registered shape.
    pub fn is_valid(&self, handle: ShapeHandle) -> bool {
        handle.generation() != 0
            && self.generation.get(handle.index()).copied() == Some(handle.generation())
    }

    /// Invalidate `handle`'s slot, bumping its generation and returning the
    /// slot to the free list. Returns `false` (a no-op) if already invalid.
    pub fn remove(&mut self, handle: ShapeHandle) -> bool {
        if !self.is_valid(handle) {
            return false;
        }
        let index = handle.index();
        self.generation[index] = self.generation[index].wrapping_add(1).max(1);
        self.free_list.push(index);
        true
    }

    /// Overwrite a sphere's parameters, returning `(old_aabb, new_aabb)`.
    /// No-op (`None`) if `handle` is invalid or not a sphere.
    pub fn update_sphere(&mut self, handle: ShapeHandle, params: SphereParams) -> Option<(Aabb, Aabb)> {
        if !self.is_valid(handle) || self.type_tag[handle.index()] != ShapeKind::Sphere {
            return None;
        }
        let index = handle.index();
        let old_aabb = self.aabb[index];
        let new_aabb = sphere_aabb(&params);
        self.spheres[self.pool_index[index]] = params;
        self.aabb[index] = new_aabb;
        Some((old_aabb, new_aabb))
    }

    /// Overwrite a capsule's parameters, returning `(old_aabb, new_aabb)`.
    pub fn update_capsule(&mut self, handle: ShapeHandle, params: CapsuleParams) -> Option<(Aabb, Aabb)> {
        if !self.is_valid(handle) || self.type_tag[handle.index()] != ShapeKind::Capsule {
            return None;
        }
        let index = handle.index();
        let old_aabb = self.aabb[index];
        let new_aabb = capsule_aabb(&params);
        self.capsules[self.pool_index[index]] = params;
        self.aabb[index] = new_aabb;
        Some((old_aabb, new_aabb))
    }

    /// Overwrite a cylinder's parameters, returning `(old_aabb, new_aabb)`.
    pub fn update_cylinder(&mut self, handle: ShapeHandle, params: CylinderParams) -> Option<(Aabb, Aabb)> {
        if !self.is_valid(handle) || self.type_tag[handle.index()] != ShapeKind::Cylinder {
            return None;
        }
        let index = handle.index();
        let old_aabb = self.aabb[index];
        let new_aabb = cylinder_aabb(&params);
        self.cylinders[self.pool_index[index]] = params;
        self.aabb[index] = new_aabb;
        Some((old_aabb, new_aabb))
    }

    /// Overwrite a box's parameters, returning `(old_aabb, new_aabb)`.
    pub fn update_box(&mut self, handle: ShapeHandle, params: BoxParams) -> Option<(Aabb, Aabb)> {
        if !self.is_valid(handle) || self.type_tag[handle.index()] != ShapeKind::Box {
            return None;
        }
        let index = handle.index();
        let old_aabb = self.aabb[index];
        let new_aabb = box_aabb(&params);
        self.boxes[self.pool_index[index]] = params;
        self.aabb[index] = new_aabb;
        Some((old_aabb, new_aabb))
    }

    /// This shape's layer mask, or `None` if `handle` is invalid.
    pub fn layer_mask(&self, handle: ShapeHandle) -> Option<u32> {
        self.is_valid(handle).then(|| self.layer_mask[handle.index()])
    }

    /// Overwrite this shape's layer mask. No-op if `handle` is invalid.
    pub fn set_layer_mask(&mut self, handle: ShapeHandle, mask: u32) -> bool {
        if !self.is_valid(handle) {
            return false;
        }
        self.layer_mask[handle.index()] = mask;
        true
    }

    /// This shape's opaque user data, or `None` if `handle` is invalid.
    pub fn user_data(&self, handle: ShapeHandle) -> Option<i64> {
        self.is_valid(handle).then(|| self.user_data[handle.index()])
    }

    /// This shape's current AABB, by raw index (the broad-phase only ever
    /// holds indices, never handles).
    pub fn aabb_at(&self, index: usize) -> Aabb {
        self.aabb[index]
    }

    /// This shape's layer mask, by raw index.
    pub fn layer_mask_at(&self, index: usize) -> u32 {
        self.layer_mask[index]
    }

    /// Whether the shape at `index` is marked static.
    pub fn is_static_at(&self, index: usize) -> bool {
        self.is_static[index]
    }

    /// Borrowed view of the concrete shape parameters at `index`.
    pub fn shape_at(&self, index: usize) -> ShapeRef<'_> {
        match self.type_tag[index] {
            ShapeKind::Sphere => ShapeRef::Sphere(&self.spheres[self.pool_index[index]]),
            ShapeKind::Capsule => ShapeRef::Capsule(&self.capsules[self.pool_index[index]]),
            ShapeKind::Cylinder => ShapeRef::Cylinder(&self.cylinders[self.pool_index[index]]),
            ShapeKind::Box => ShapeRef::Box(&self.boxes[self.pool_index[index]]),
        }
    }

    /// Handle currently occupying `index`, for callers that only have a
    /// broad-phase-reported index and need to hand the caller a stable
    /// handle back.
    pub fn handle_at(&self, index: usize) -> ShapeHandle {
        ShapeHandle::new(index, self.generation[index])
    }
}

pub(crate) fn sphere_aabb(params: &SphereParams) -> Aabb {
    Aabb::from_center_half_extents(
        params.center,
        foundry_core::Vector3::new(params.radius, params.radius, params.radius),
    )
}

pub(crate) fn capsule_aabb(params: &CapsuleParams) -> Aabb {
    let segment = Aabb::from_points(params.start, params.end);
    segment.expanded(params.radius)
}

pub(crate) fn cylinder_aabb(params: &CylinderParams) -> Aabb {
    Aabb::from_center_half_extents(
        params.center,
        foundry_core::Vector3::new(params.radius, params.half_height, params.radius),
    )
}

pub(crate) fn box_aabb(params: &BoxParams) -> Aabb {
    let (sin, cos) = params.yaw.sin_cos();
    let he = params.half_extents;
    let extent_x = he.x * cos.abs() + he.z * sin.abs();
    let extent_z = he.x * sin.abs() + he.z * cos.abs();
    Aabb::from_center_half_extents(params.center, foundry_core::Vector3::new(extent_x, he.y, extent_z))
}
