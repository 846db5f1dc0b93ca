//! 2D geometry operations on the ground plane
//!
//! This module provides the planar predicates used by the zone builder and the
//! query code. All operations work on the XZ plane (Y-up coordinate system) and
//! ignore the Y component of their inputs.

use glam::Vec3;

/// Calculate twice the signed area of a triangle on the XZ plane.
///
/// The sign indicates the winding order, reading `(x, z)` as a regular
/// `(x, y)` plane:
/// - Positive: counter-clockwise (`c` lies left of the line `a -> b`)
/// - Negative: clockwise (`c` lies right of the line `a -> b`)
/// - Zero: degenerate (collinear points)
#[inline]
pub fn tri_area_2d(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    abx * acz - abz * acx
}

/// Check if point c is left of the line from a to b (on XZ plane).
#[inline]
pub fn left(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) > 0.0
}

/// Check if point c is left of or on the line from a to b (on XZ plane).
#[inline]
pub fn left_on(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) >= 0.0
}

/// Check if point c is right of the line from a to b (on XZ plane).
#[inline]
pub fn right(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) < 0.0
}

/// Check if point c is right of or on the line from a to b (on XZ plane).
#[inline]
pub fn right_on(a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    tri_area_2d(a, b, c) <= 0.0
}

/// Check if two points coincide on the XZ plane within a small tolerance.
#[inline]
pub fn v_equal_2d(a: &Vec3, b: &Vec3) -> bool {
    dist_sqr_2d(a, b) < 1.0e-10
}

/// Calculate squared distance between two points on the XZ plane.
#[inline]
pub fn dist_sqr_2d(a: &Vec3, b: &Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Calculate distance between two points on the XZ plane.
#[inline]
pub fn dist_2d(a: &Vec3, b: &Vec3) -> f32 {
    dist_sqr_2d(a, b).sqrt()
}

/// Calculate distance squared from a point to a segment on the XZ plane.
///
/// Returns the squared distance and the clamped parameter `t` of the closest
/// point along `a -> b`.
pub fn dist_point_segment_sqr_2d(p: &Vec3, a: &Vec3, b: &Vec3) -> (f32, f32) {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let d = dx * dx + dz * dz;
    let t = if d > f32::EPSILON {
        (((p.x - a.x) * dx + (p.z - a.z) * dz) / d).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let qx = a.x + t * dx - p.x;
    let qz = a.z + t * dz - p.z;
    (qx * qx + qz * qz, t)
}

/// Intersect two segments on the XZ plane.
///
/// Returns the parameters `(s, t)` of the intersection along `a0 -> a1` and
/// `b0 -> b1` respectively, or `None` when the segments do not cross or are
/// parallel.
pub fn intersect_segments_2d(a0: &Vec3, a1: &Vec3, b0: &Vec3, b1: &Vec3) -> Option<(f32, f32)> {
    const EPS: f32 = 1.0e-6;

    let ux = a1.x - a0.x;
    let uz = a1.z - a0.z;
    let vx = b1.x - b0.x;
    let vz = b1.z - b0.z;
    let wx = a0.x - b0.x;
    let wz = a0.z - b0.z;

    let d = ux * vz - uz * vx;
    if d.abs() < EPS {
        return None;
    }

    let s = (vx * wz - vz * wx) / d;
    let t = (ux * wz - uz * wx) / d;
    if !(-EPS..=1.0 + EPS).contains(&s) || !(-EPS..=1.0 + EPS).contains(&t) {
        return None;
    }

    Some((s.clamp(0.0, 1.0), t.clamp(0.0, 1.0)))
}

/// Check if a point lies inside a counter-clockwise convex polygon (on XZ plane).
///
/// Points within `eps` (a distance) of the boundary count as inside, so a
/// point on an edge shared by two polygons is reported by both.
pub fn point_in_convex_polygon_2d(p: &Vec3, verts: &[Vec3], eps: f32) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        let len = dist_2d(a, b);
        if len <= f32::EPSILON {
            continue;
        }
        if tri_area_2d(a, b, p) / len < -eps {
            return false;
        }
    }

    true
}

/// Result of clipping a segment against a convex polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPolyHit {
    /// Normalized distance along the segment where it enters the polygon
    pub tmin: f32,
    /// Normalized distance along the segment where it exits the polygon
    pub tmax: f32,
    /// Edge the segment enters through, `None` if it starts inside
    pub seg_min: Option<usize>,
    /// Edge the segment exits through, `None` if it ends inside
    pub seg_max: Option<usize>,
}

/// Finds the intersection of a 2D segment with a counter-clockwise convex polygon.
///
/// Edge `i` runs from `verts[i]` to `verts[(i + 1) % n]`. Returns `None` when
/// the segment misses the polygon.
pub fn intersect_segment_poly_2d(p0: &Vec3, p1: &Vec3, verts: &[Vec3]) -> Option<SegmentPolyHit> {
    const EPS: f32 = 0.000001;

    let mut hit = SegmentPolyHit {
        tmin: 0.0,
        tmax: 1.0,
        seg_min: None,
        seg_max: None,
    };

    let dir_x = p1.x - p0.x;
    let dir_z = p1.z - p0.z;
    let n = verts.len();

    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        let edge_x = b.x - a.x;
        let edge_z = b.z - a.z;

        let num = tri_area_2d(a, b, p0);
        let den = dir_x * edge_z - dir_z * edge_x;

        if den.abs() < EPS {
            // Segment is nearly parallel to this edge
            if num < 0.0 {
                return None;
            }
            continue;
        }

        let t = num / den;
        if den < 0.0 {
            // Segment is entering across this edge
            if t > hit.tmin {
                hit.tmin = t;
                hit.seg_min = Some(i);
                if hit.tmin > hit.tmax {
                    return None;
                }
            }
        } else if t < hit.tmax {
            // Segment is leaving across this edge
            hit.tmax = t;
            hit.seg_max = Some(i);
            if hit.tmax < hit.tmin {
                return None;
            }
        }
    }

    Some(hit)
}
