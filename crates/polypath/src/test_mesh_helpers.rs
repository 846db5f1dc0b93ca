//! Test mesh creation helpers
//!
//! All meshes lie flat on the ground plane (y = 0) with triangles listed in a
//! fixed order, so node ids in tests are predictable: node ids follow input
//! order within each group.

use glam::Vec3;
use polypath_common::Result;

use crate::zone::Zone;

/// Weld tolerance used by every helper mesh
pub const TEST_WELD_TOLERANCE: f32 = 1.0e-4;

/// Ground-plane point
pub fn v(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}

/// Two triangles of the unit square split along its diagonal
///
/// Node 0 is `(0,0) (1,0) (1,1)`, node 1 is `(0,0) (1,1) (0,1)`.
pub fn unit_square_triangles() -> Vec<[Vec3; 3]> {
    square_triangles(0.0, 0.0)
}

pub fn create_unit_square_zone() -> Result<Zone> {
    Zone::build(&unit_square_triangles(), TEST_WELD_TOLERANCE)
}

fn square_triangles(x: f32, z: f32) -> Vec<[Vec3; 3]> {
    vec![
        [v(x, z), v(x + 1.0, z), v(x + 1.0, z + 1.0)],
        [v(x, z), v(x + 1.0, z + 1.0), v(x, z + 1.0)],
    ]
}

/// `n` unit squares laid along the x axis, two nodes per square.
///
/// Square `i` holds nodes `2i` (lower right half) and `2i + 1` (upper left
/// half), so the node chain runs `1, 0, 3, 2, 5, 4, ...`.
pub fn create_strip_zone(n: usize) -> Result<Zone> {
    let triangles: Vec<[Vec3; 3]> = (0..n)
        .flat_map(|i| square_triangles(i as f32, 0.0))
        .collect();
    Zone::build(&triangles, TEST_WELD_TOLERANCE)
}

/// `n` by `n` unit squares covering `[0, n] x [0, n]`, rows along x first
pub fn create_grid_zone(n: usize) -> Result<Zone> {
    let mut triangles = Vec::with_capacity(n * n * 2);
    for row in 0..n {
        for col in 0..n {
            triangles.extend(square_triangles(col as f32, row as f32));
        }
    }
    Zone::build(&triangles, TEST_WELD_TOLERANCE)
}

/// Two unit squares that share no edge: group 0 at the origin, group 1 at x = 3
pub fn create_two_islands_zone() -> Result<Zone> {
    let mut triangles = square_triangles(0.0, 0.0);
    triangles.extend(square_triangles(3.0, 0.0));
    Zone::build(&triangles, TEST_WELD_TOLERANCE)
}

/// Three triangles forming a straight 2x1 corridor
pub fn create_straight_corridor_zone() -> Result<Zone> {
    let b0 = v(0.0, 0.0);
    let b1 = v(1.0, 0.0);
    let b2 = v(2.0, 0.0);
    let t0 = v(0.0, 1.0);
    let t1 = v(1.0, 1.0);
    Zone::build(&[[b0, b1, t0], [b1, t1, t0], [b1, b2, t1]], TEST_WELD_TOLERANCE)
}

/// An L-shaped corridor turning around the inner corner `(1, 1)`.
///
/// Covers `[0,1] x [0,1]`, `[1,2] x [0,1]` and `[1,2] x [1,2]`. The corridor
/// from node 1 (upper left of the first square) to node 5 runs `1, 0, 3, 4, 5`.
pub fn create_l_corridor_zone() -> Result<Zone> {
    let triangles = [
        [v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)],
        [v(0.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
        [v(1.0, 0.0), v(2.0, 0.0), v(2.0, 1.0)],
        [v(1.0, 0.0), v(2.0, 1.0), v(1.0, 1.0)],
        [v(1.0, 1.0), v(2.0, 1.0), v(2.0, 2.0)],
        [v(1.0, 1.0), v(2.0, 2.0), v(1.0, 2.0)],
    ];
    Zone::build(&triangles, TEST_WELD_TOLERANCE)
}

/// Asserts that two points agree within `eps`
pub fn assert_near(actual: Vec3, expected: Vec3, eps: f32) {
    assert!(
        (actual - expected).length() <= eps,
        "expected {expected}, got {actual}"
    );
}
