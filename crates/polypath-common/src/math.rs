//! Triangle math: areas, barycentric coordinates and sampling

use crate::tri_area_2d;
use glam::Vec3;

/// Calculates the area of a triangle
pub fn triangle_area(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    let ab = *b - *a;
    let ac = *c - *a;
    ab.cross(ac).length() * 0.5
}

/// Arithmetic mean of a set of points
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// Barycentric coordinates of `p` relative to a triangle, on the XZ plane.
///
/// Returns the weights of `a`, `b` and `c`, or `None` if the triangle is
/// degenerate when projected onto the ground plane.
pub fn barycentric_2d(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> Option<Vec3> {
    let area = tri_area_2d(a, b, c);
    if area.abs() < f32::EPSILON {
        return None;
    }

    let u = tri_area_2d(b, c, p) / area;
    let v = tri_area_2d(c, a, p) / area;
    Some(Vec3::new(u, v, 1.0 - u - v))
}

/// Checks if a point lies inside a triangle projected onto the XZ plane
pub fn point_in_triangle_2d(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> bool {
    const EPS: f32 = 1.0e-5;
    barycentric_2d(p, a, b, c).is_some_and(|w| w.x >= -EPS && w.y >= -EPS && w.z >= -EPS)
}

/// Height of the triangle's plane below/above `p`, interpolated barycentrically
pub fn height_on_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> Option<f32> {
    barycentric_2d(p, a, b, c).map(|w| w.x * a.y + w.y * b.y + w.z * c.y)
}

/// Moves `p` vertically onto the plane of the triangle.
///
/// Points whose projection is degenerate are returned unchanged.
pub fn project_onto_triangle(p: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    match height_on_triangle(p, a, b, c) {
        Some(y) => Vec3::new(p.x, y, p.z),
        None => *p,
    }
}

/// Maps two uniform samples in `[0, 1)` to a uniformly distributed point on a triangle
pub fn random_point_in_triangle(a: &Vec3, b: &Vec3, c: &Vec3, s: f32, t: f32) -> Vec3 {
    let r = s.sqrt();
    let wa = 1.0 - r;
    let wb = r * (1.0 - t);
    let wc = r * t;
    *a * wa + *b * wb + *c * wc
}

/// Square a value (x²)
#[inline]
pub fn sqr<T: std::ops::Mul<Output = T> + Copy>(x: T) -> T {
    x * x
}
