//! Closed-form closest-point helpers shared by the spatial world's
//! narrow-phase tests (capsule/cylinder axis math, segment sweeps).

use crate::vector3::Vector3;

/// Closest point on the segment `a..b` to `p`, and the interpolation
/// parameter `t` in `[0, 1]` at which it occurs.
pub fn closest_point_on_segment(p: Vector3, a: Vector3, b: Vector3) -> (Vector3, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest point on an AABB (given by min/max corners) to `p`.
pub fn closest_point_on_aabb(p: Vector3, min: Vector3, max: Vector3) -> Vector3 {
    Vector3::new(
        p.x.clamp(min.x, max.x),
        p.y.clamp(min.y, max.y),
        p.z.clamp(min.z, max.z),
    )
}

/// Closest points between two segments `p1..q1` and `p2..q2`, returned as
/// `(point_on_first, point_on_second, t1, t2)` with `t1`/`t2` the
/// interpolation parameters on each segment.
///
/// Standard closest-point-between-segments derivation (Ericson,
/// *Real-Time Collision Detection*, §5.1.9); degenerate (point) segments
/// fall back to point/segment and point/point cases.
pub fn closest_points_on_segments(
    p1: Vector3,
    q1: Vector3,
    p2: Vector3,
    q2: Vector3,
) -> (Vector3, Vector3, f32, f32) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a <= f32::EPSILON && e <= f32::EPSILON {
        return (p1, p2, 0.0, 0.0);
    }

    let (mut s, mut t);
    if a <= f32::EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e <= f32::EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            s = if denom.abs() > f32::EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
        }
    }

    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    (c1, c2, s, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_on_segment_clamps_to_endpoint() {
        let (p, t) = closest_point_on_segment(
            Vector3::new(-5.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
        );
        assert_eq!(t, 0.0);
        assert_eq!(p, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn closest_point_on_segment_midpoint() {
        let (p, t) = closest_point_on_segment(
            Vector3::new(5.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
        );
        assert!((t - 0.5).abs() < 1e-6);
        assert_eq!(p, Vector3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn closest_point_on_aabb_clamps_each_axis() {
        let p = closest_point_on_aabb(
            Vector3::new(5.0, -5.0, 0.5),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        assert_eq!(p, Vector3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn closest_points_on_parallel_segments() {
        let (c1, c2, _, _) = closest_points_on_segments(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(10.0, 1.0, 0.0),
        );
        assert!((c1 - c2).y.abs() - 1.0 < 1e-4);
    }
}
