//! Closed-form (query-kind × shape-kind) geometric tests (spec §4.5.4):
//! pure functions, no shared state, one per combination the six query
//! operations in [`crate::world`] need. Sweeps against non-sphere shapes
//! are approximated by expanding the target by the swept radius and
//! ray-casting (spec §4.5.4); boxes transform the query into box-local
//! space to account for their yaw.

use foundry_core::geometry::closest_point_on_segment;
use foundry_core::Vector3;

use crate::shape::{BoxParams, CapsuleParams, CylinderParams, SphereParams};

/// A narrow-phase hit, prior to attaching shape index/user-data context
/// (spec §4.5.4 "enough information for a `HitResult`").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrowHit {
    /// Ray parameter / time-of-impact / penetration depth, depending on
    /// the query kind that produced this hit.
    pub distance: f32,
    /// World-space contact point.
    pub point: Vector3,
    /// Unit-length surface normal at the contact point.
    pub normal: Vector3,
}

fn rotate_y(v: Vector3, angle: f32) -> Vector3 {
    let (sin, cos) = angle.sin_cos();
    Vector3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

// ---------------------------------------------------------------- point ---

/// Does `point` lie within (or on) the sphere?
pub fn point_in_sphere(point: Vector3, sphere: &SphereParams) -> bool {
    point.distance_squared(sphere.center) <= sphere.radius * sphere.radius
}

/// Does `point` lie within (or on) the capsule?
pub fn point_in_capsule(point: Vector3, capsule: &CapsuleParams) -> bool {
    let (closest, _) = closest_point_on_segment(point, capsule.start, capsule.end);
    point.distance_squared(closest) <= capsule.radius * capsule.radius
}

/// Does `point` lie within (or on) the upright cylinder?
pub fn point_in_cylinder(point: Vector3, cylinder: &CylinderParams) -> bool {
    let dy = point.y - cylinder.center.y;
    if dy.abs() > cylinder.half_height {
        return false;
    }
    let dx = point.x - cylinder.center.x;
    let dz = point.z - cylinder.center.z;
    dx * dx + dz * dz <= cylinder.radius * cylinder.radius
}

/// Does `point` lie within (or on) the yawed box?
pub fn point_in_box(point: Vector3, b: &BoxParams) -> bool {
    let local = rotate_y(point - b.center, -b.yaw);
    local.x.abs() <= b.half_extents.x && local.y.abs() <= b.half_extents.y && local.z.abs() <= b.half_extents.z
}

// ------------------------------------------------------------------ ray ---

/// Ray/sphere intersection: exact quadratic solve.
pub fn ray_sphere(origin: Vector3, dir: Vector3, max_dist: f32, sphere: &SphereParams) -> Option<NarrowHit> {
    let oc = origin - sphere.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = -b - sqrt_disc;
    let t1 = -b + sqrt_disc;
    let t = if t0 >= 0.0 {
        t0
    } else if t1 >= 0.0 {
        t1
    } else {
        return None;
    };
    if t > max_dist {
        return None;
    }
    let point = origin + dir * t;
    let normal = (point - sphere.center).normalized_or(Vector3::UNIT_Y);
    Some(NarrowHit { distance: t, point, normal })
}

/// Ray/capsule intersection: infinite-cylinder wall solve clipped to the
/// segment's span, plus the two hemispherical end caps.
pub fn ray_capsule(origin: Vector3, dir: Vector3, max_dist: f32, capsule: &CapsuleParams) -> Option<NarrowHit> {
    let axis = capsule.end - capsule.start;
    let axis_len = axis.length();
    let Some(axis_dir) = axis.normalized() else {
        return ray_sphere(origin, dir, max_dist, &SphereParams { center: capsule.start, radius: capsule.radius });
    };

    let mut best: Option<NarrowHit> = None;
    let mut consider = |hit: NarrowHit| {
        if hit.distance >= 0.0
            && hit.distance <= max_dist
            && best.map(|b| hit.distance < b.distance).unwrap_or(true)
        {
            best = Some(hit);
        }
    };

    let oa = origin - capsule.start;
    let d_parallel = dir.dot(axis_dir);
    let d_perp = dir - axis_dir * d_parallel;
    let m_parallel = oa.dot(axis_dir);
    let m_perp = oa - axis_dir * m_parallel;

    let a = d_perp.length_squared();
    if a > f32::EPSILON {
        let b = 2.0 * m_perp.dot(d_perp);
        let c = m_perp.length_squared() - capsule.radius * capsule.radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sqrt_disc = disc.sqrt();
            for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                if t < 0.0 {
                    continue;
                }
                let height = m_parallel + t * d_parallel;
                if (0.0..=axis_len).contains(&height) {
                    let point = origin + dir * t;
                    let axis_point = capsule.start + axis_dir * height;
                    let normal = (point - axis_point).normalized_or(Vector3::UNIT_Y);
                    consider(NarrowHit { distance: t, point, normal });
                    break;
                }
            }
        }
    }

    if let Some(cap_hit) = ray_sphere(origin, dir, max_dist, &SphereParams { center: capsule.start, radius: capsule.radius }) {
        consider(cap_hit);
    }
    if let Some(cap_hit) = ray_sphere(origin, dir, max_dist, &SphereParams { center: capsule.end, radius: capsule.radius }) {
        consider(cap_hit);
    }
    best
}

/// Ray/cylinder intersection: finite upright cylinder, flat circular caps.
pub fn ray_cylinder(origin: Vector3, dir: Vector3, max_dist: f32, cyl: &CylinderParams) -> Option<NarrowHit> {
    let mut best: Option<NarrowHit> = None;
    let mut consider = |hit: NarrowHit| {
        if hit.distance >= 0.0
            && hit.distance <= max_dist
            && best.map(|b| hit.distance < b.distance).unwrap_or(true)
        {
            best = Some(hit);
        }
    };

    let ox = origin.x - cyl.center.x;
    let oz = origin.z - cyl.center.z;
    let a = dir.x * dir.x + dir.z * dir.z;
    if a > f32::EPSILON {
        let b = 2.0 * (ox * dir.x + oz * dir.z);
        let c = ox * ox + oz * oz - cyl.radius * cyl.radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sqrt_disc = disc.sqrt();
            for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                if t < 0.0 {
                    continue;
                }
                let y = origin.y + dir.y * t;
                if (y - cyl.center.y).abs() <= cyl.half_height {
                    let point = origin + dir * t;
                    let normal = Vector3::new(point.x - cyl.center.x, 0.0, point.z - cyl.center.z)
                        .normalized_or(Vector3::UNIT_X);
                    consider(NarrowHit { distance: t, point, normal });
                    break;
                }
            }
        }
    }

    if dir.y.abs() > f32::EPSILON {
        for (plane_y, normal) in [
            (cyl.center.y + cyl.half_height, Vector3::UNIT_Y),
            (cyl.center.y - cyl.half_height, -Vector3::UNIT_Y),
        ] {
            let t = (plane_y - origin.y) / dir.y;
            if t < 0.0 {
                continue;
            }
            let point = origin + dir * t;
            let dx = point.x - cyl.center.x;
            let dz = point.z - cyl.center.z;
            if dx * dx + dz * dz <= cyl.radius * cyl.radius {
                consider(NarrowHit { distance: t, point, normal });
            }
        }
    }
    best
}

/// Ray/box intersection: slab test in the box's yaw-local space.
pub fn ray_box(origin: Vector3, dir: Vector3, max_dist: f32, b: &BoxParams) -> Option<NarrowHit> {
    let local_origin = rotate_y(origin - b.center, -b.yaw);
    let local_dir = rotate_y(dir, -b.yaw);
    let he = b.half_extents;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut hit_axis = 0usize;
    let mut hit_sign = 1.0f32;

    let axes = [(local_origin.x, local_dir.x, he.x), (local_origin.y, local_dir.y, he.y), (local_origin.z, local_dir.z, he.z)];
    for (axis_index, (o, d, half)) in axes.into_iter().enumerate() {
        if d.abs() <= f32::EPSILON {
            if o < -half || o > half {
                return None;
            }
            continue;
        }
        let mut t1 = (-half - o) / d;
        let mut t2 = (half - o) / d;
        let mut sign = -1.0;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            sign = 1.0;
        }
        if t1 > t_min {
            t_min = t1;
            hit_axis = axis_index;
            hit_sign = sign;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if t_min < 0.0 || t_min > max_dist {
        return None;
    }

    let local_normal = match hit_axis {
        0 => Vector3::new(hit_sign, 0.0, 0.0),
        1 => Vector3::new(0.0, hit_sign, 0.0),
        _ => Vector3::new(0.0, 0.0, hit_sign),
    };
    let normal = rotate_y(local_normal, b.yaw);
    let point = origin + dir * t_min;
    Some(NarrowHit { distance: t_min, point, normal })
}

// ----------------------------------------------------------- overlap ------

/// Sphere/sphere overlap; `distance` is penetration depth (spec §8).
pub fn sphere_overlap_sphere(center: Vector3, radius: f32, sphere: &SphereParams) -> Option<NarrowHit> {
    let d = center.distance(sphere.center);
    let penetration = radius + sphere.radius - d;
    if penetration < 0.0 {
        return None;
    }
    let normal = (center - sphere.center).normalized_or(Vector3::UNIT_Y);
    let point = sphere.center + normal * sphere.radius;
    Some(NarrowHit { distance: penetration, point, normal })
}

/// Sphere/capsule overlap (query sphere vs. the capsule's swept segment).
pub fn sphere_overlap_capsule(center: Vector3, radius: f32, capsule: &CapsuleParams) -> Option<NarrowHit> {
    let (closest, _) = closest_point_on_segment(center, capsule.start, capsule.end);
    let d = center.distance(closest);
    let penetration = radius + capsule.radius - d;
    if penetration < 0.0 {
        return None;
    }
    let normal = (center - closest).normalized_or(Vector3::UNIT_Y);
    let point = closest + normal * capsule.radius;
    Some(NarrowHit { distance: penetration, point, normal })
}

/// Sphere/cylinder overlap, approximated via the cylinder's medial
/// segment (spec §4.5.4 narrow-phase approximation note).
pub fn sphere_overlap_cylinder(center: Vector3, radius: f32, cyl: &CylinderParams) -> Option<NarrowHit> {
    let top = Vector3::new(cyl.center.x, cyl.center.y + cyl.half_height, cyl.center.z);
    let bottom = Vector3::new(cyl.center.x, cyl.center.y - cyl.half_height, cyl.center.z);
    let (closest, _) = closest_point_on_segment(center, bottom, top);
    let d = center.distance(closest);
    let penetration = radius + cyl.radius - d;
    if penetration < 0.0 {
        return None;
    }
    let normal = (center - closest).normalized_or(Vector3::UNIT_Y);
    let point = closest + normal * cyl.radius;
    Some(NarrowHit { distance: penetration, point, normal })
}

/// Sphere/box overlap via closest point in the box's yaw-local space.
pub fn sphere_overlap_box(center: Vector3, radius: f32, b: &BoxParams) -> Option<NarrowHit> {
    let local = rotate_y(center - b.center, -b.yaw);
    let clamped = foundry_core::geometry::closest_point_on_aabb(local, -b.half_extents, b.half_extents);
    let local_normal_source = local - clamped;
    let d = local_normal_source.length();
    let penetration = radius - d;
    if penetration < 0.0 {
        return None;
    }
    let local_normal = local_normal_source.normalized_or(Vector3::UNIT_Y);
    let normal = rotate_y(local_normal, b.yaw);
    let world_point = b.center + rotate_y(clamped, b.yaw);
    Some(NarrowHit { distance: penetration, point: world_point, normal })
}

// ------------------------------------------------------------------ slash -

/// True if `p`, known to lie in the quad's plane, is inside the convex
/// quadrilateral `corners` (given in winding order).
fn point_in_quad(p: Vector3, corners: [Vector3; 4], plane_normal: Vector3) -> bool {
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let edge = b - a;
        let to_point = p - a;
        if edge.cross(to_point).dot(plane_normal) < 0.0 {
            return false;
        }
    }
    true
}

fn quad_plane(corners: [Vector3; 4]) -> (Vector3, Vector3) {
    let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]).normalized_or(Vector3::UNIT_Y);
    (corners[0], normal)
}

/// Does the sample point `p` (with an effective `radius`) intersect the
/// quad swept by `corners`?
fn sample_hits_quad(p: Vector3, radius: f32, corners: [Vector3; 4]) -> Option<NarrowHit> {
    let (plane_point, normal) = quad_plane(corners);
    let signed_dist = (p - plane_point).dot(normal);
    if signed_dist.abs() > radius {
        return None;
    }
    let projected = p - normal * signed_dist;
    if !point_in_quad(projected, corners, normal) {
        return None;
    }
    Some(NarrowHit { distance: signed_dist.abs(), point: projected, normal })
}

/// Sphere vs. slash quad.
pub fn slash_sphere(corners: [Vector3; 4], sphere: &SphereParams) -> Option<NarrowHit> {
    sample_hits_quad(sphere.center, sphere.radius, corners)
}

/// Capsule vs. slash quad: sampled at both ends and the midpoint.
pub fn slash_capsule(corners: [Vector3; 4], capsule: &CapsuleParams) -> Option<NarrowHit> {
    let mid = capsule.start.lerp(capsule.end, 0.5);
    [capsule.start, mid, capsule.end]
        .into_iter()
        .find_map(|p| sample_hits_quad(p, capsule.radius, corners))
}

/// Cylinder vs. slash quad: sampled at top, center, and bottom.
pub fn slash_cylinder(corners: [Vector3; 4], cyl: &CylinderParams) -> Option<NarrowHit> {
    let top = Vector3::new(cyl.center.x, cyl.center.y + cyl.half_height, cyl.center.z);
    let bottom = Vector3::new(cyl.center.x, cyl.center.y - cyl.half_height, cyl.center.z);
    [top, cyl.center, bottom].into_iter().find_map(|p| sample_hits_quad(p, cyl.radius, corners))
}

/// Box vs. slash quad: sampled at the box center with a radius covering
/// its largest half-extent (a conservative, not exact, test).
pub fn slash_box(corners: [Vector3; 4], b: &BoxParams) -> Option<NarrowHit> {
    let radius = b.half_extents.x.max(b.half_extents.y).max(b.half_extents.z);
    sample_hits_quad(b.center, radius, corners)
}

/// Inflate a sphere's radius by `extra` — the sweep-by-ray-casting
/// approximation [`crate::world::SpatialWorld::capsule_sweep`] uses
/// (spec §4.5.4): a swept sphere of radius `r` against a target sphere is
/// *exactly* equivalent to a ray against the target inflated by `r` (the
/// Minkowski sum of two spheres is a sphere); for capsule/cylinder/box
/// targets this inflation is the documented approximation.
pub fn expand_sphere(s: &SphereParams, extra: f32) -> SphereParams {
    SphereParams { center: s.center, radius: s.radius + extra }
}

/// See [`expand_sphere`].
pub fn expand_capsule(c: &CapsuleParams, extra: f32) -> CapsuleParams {
    CapsuleParams { start: c.start, end: c.end, radius: c.radius + extra }
}

/// See [`expand_sphere`]. Approximate: does not round the cylinder's cap
/// edges the way an exact Minkowski sum would.
pub fn expand_cylinder(c: &CylinderParams, extra: f32) -> CylinderParams {
    CylinderParams { center: c.center, half_height: c.half_height, radius: c.radius + extra }
}

/// See [`expand_sphere`]. Approximate: does not round the box's corners
/// the way an exact Minkowski sum would.
pub fn expand_box(b: &BoxParams, extra: f32) -> BoxParams {
    BoxParams {
        center: b.center,
        half_extents: b.half_extents + Vector3::new(extra, extra, extra),
        yaw: b.yaw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_sphere_hits_near_surface() {
        let sphere = SphereParams { center: Vector3::ZERO, radius: 1.0 };
        let hit = ray_sphere(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0, &sphere).unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!((hit.point - Vector3::new(0.0, 0.0, 1.0)).length() < 1e-4);
        assert!((hit.normal - Vector3::new(0.0, 0.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn ray_sphere_misses() {
        let sphere = SphereParams { center: Vector3::ZERO, radius: 1.0 };
        assert!(ray_sphere(Vector3::new(5.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0), 100.0, &sphere).is_none());
    }

    #[test]
    fn sphere_overlap_sphere_penetration() {
        let target = SphereParams { center: Vector3::ZERO, radius: 1.0 };
        let hit = sphere_overlap_sphere(Vector3::new(1.5, 0.0, 0.0), 1.0, &target).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-4);
    }

    #[test]
    fn point_in_box_respects_yaw() {
        let b = BoxParams {
            center: Vector3::ZERO,
            half_extents: Vector3::new(2.0, 1.0, 1.0),
            yaw: std::f32::consts::FRAC_PI_2,
        };
        // After a 90-degree yaw, the box's long axis points along Z.
        assert!(point_in_box(Vector3::new(0.5, 0.0, 1.9), &b));
        assert!(!point_in_box(Vector3::new(1.9, 0.0, 0.5), &b));
    }

    #[test]
    fn ray_capsule_hits_cylindrical_wall() {
        let capsule = CapsuleParams { start: Vector3::new(0.0, -5.0, 0.0), end: Vector3::new(0.0, 5.0, 0.0), radius: 1.0 };
        let hit = ray_capsule(Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0), 100.0, &capsule).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-3);
    }

    #[test]
    fn ray_cylinder_hits_wall_then_cap() {
        let cyl = CylinderParams { center: Vector3::ZERO, half_height: 2.0, radius: 1.0 };
        let wall_hit = ray_cylinder(Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0), 100.0, &cyl).unwrap();
        assert!((wall_hit.distance - 4.0).abs() < 1e-3);
        let cap_hit = ray_cylinder(Vector3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0), 100.0, &cyl).unwrap();
        assert!((cap_hit.distance - 8.0).abs() < 1e-3);
    }

    #[test]
    fn ray_box_hits_face() {
        let b = BoxParams { center: Vector3::ZERO, half_extents: Vector3::new(1.0, 1.0, 1.0), yaw: 0.0 };
        let hit = ray_box(Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0), 100.0, &b).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vector3::new(1.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn slash_sphere_detects_quad_through_center() {
        let corners = [
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
        ];
        let sphere = SphereParams { center: Vector3::ZERO, radius: 0.1 };
        assert!(slash_sphere(corners, &sphere).is_some());
    }

    #[test]
    fn slash_sphere_misses_outside_quad_bounds() {
        let corners = [
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
        ];
        let sphere = SphereParams { center: Vector3::new(10.0, 10.0, 0.0), radius: 0.1 };
        assert!(slash_sphere(corners, &sphere).is_none());
    }
}
