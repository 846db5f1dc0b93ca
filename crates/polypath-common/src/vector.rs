//! Vector utilities for points and triangles in 3D

use glam::Vec3;

/// Calculates the distance between two points
#[inline]
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (*b - *a).length()
}

/// Calculates the squared distance between two points
#[inline]
pub fn distance_squared(a: &Vec3, b: &Vec3) -> f32 {
    (*b - *a).length_squared()
}

/// Finds the closest point on a line segment to a given point
pub fn closest_point_on_segment(p: &Vec3, a: &Vec3, b: &Vec3) -> Vec3 {
    let ab = *b - *a;
    let ab_len_sq = ab.length_squared();

    // If the line segment is just a point, return that point
    if ab_len_sq < f32::EPSILON {
        return *a;
    }

    let t = (*p - *a).dot(ab) / ab_len_sq;
    *a + ab * t.clamp(0.0, 1.0)
}

/// Finds the closest point on a triangle to a given point.
///
/// Classifies `p` against the Voronoi regions of the triangle's vertices,
/// edges and face, so the result is exact for any point in space.
pub fn closest_point_on_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let ab = *b - *a;
    let ac = *c - *a;

    let ap = *p - *a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = *p - *b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return *a + ab * v;
    }

    let cp = *p - *c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return *a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return *b + (*c - *b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    *a + ab * v + ac * w
}
