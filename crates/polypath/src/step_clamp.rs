//! Per-tick movement clamping against the walkable surface
//!
//! The clamper walks the movement segment across node boundaries. Crossing a
//! portal continues the walk in the neighbouring node; hitting a boundary edge
//! without a neighbour projects the remaining movement onto that edge so the
//! agent slides along walls instead of stopping dead.

use glam::Vec3;
use polypath_common::{
    closest_point_on_triangle, dist_point_segment_sqr_2d, intersect_segment_poly_2d,
    point_in_convex_polygon_2d, project_onto_triangle, v_equal_2d, Result,
};

use crate::zone::{Group, Node, NodeId, Zone};

/// How a clamped step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// The desired end point was reached
    Reached,
    /// Movement hit a mesh boundary and slid along it
    Sliding,
    /// The walk could not make progress and stopped at the last valid point
    /// along the movement
    Stopped,
}

/// Outcome of clamping one movement step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Farthest reachable point toward the desired end
    pub position: Vec3,
    /// Node containing `position`
    pub node: NodeId,
    pub state: StepState,
}

/// Clamps a movement from `start` toward `end` to the walkable surface.
///
/// `node` is the node the agent currently stands on. The walk crosses at most
/// as many portals as the group has nodes, so it always terminates. An end
/// point off the surface is never returned: walls clamp it, and `eps` only
/// lets the walk accept an end point next to the node when the segment test
/// misses numerically, in which case the point is pulled onto the node.
pub fn clamp_step(
    zone: &Zone,
    group: &Group,
    node: NodeId,
    start: Vec3,
    end: Vec3,
    eps: f32,
) -> Result<StepResult> {
    let mut current = group.try_node(node)?;
    let mut tri = zone.triangle(current);

    let mut from = if point_in_convex_polygon_2d(&start, &tri, 0.0) {
        start
    } else {
        let [a, b, c] = tri;
        closest_point_on_triangle(&start, &a, &b, &c)
    };

    for _ in 0..=group.len() {
        tri = zone.triangle(current);

        if point_in_convex_polygon_2d(&end, &tri, 0.0) {
            return Ok(StepResult {
                position: end,
                node: current.id(),
                state: StepState::Reached,
            });
        }

        let Some(hit) = intersect_segment_poly_2d(&from, &end, &tri) else {
            // Numerically outside the current node
            if point_in_convex_polygon_2d(&end, &tri, eps) {
                return Ok(reached(end, current, &tri));
            }
            return Ok(StepResult {
                position: from,
                node: current.id(),
                state: StepState::Stopped,
            });
        };

        let Some(edge) = hit.seg_max else {
            return Ok(reached(end, current, &tri));
        };

        let [a, b, c] = tri;
        let crossing = project_onto_triangle(&from.lerp(end, hit.tmax.clamp(0.0, 1.0)), &a, &b, &c);
        let [va, vb] = current.edge(edge);

        match current.links().iter().find(|link| link.crosses(va, vb)) {
            Some(link) => {
                current = group.try_node(link.neighbour)?;
                from = crossing;
            }
            None => {
                let p0 = tri[edge];
                let p1 = tri[(edge + 1) % 3];
                return Ok(StepResult {
                    position: slide_along_edge(crossing, end, p0, p1),
                    node: current.id(),
                    state: StepState::Sliding,
                });
            }
        }
    }

    Ok(StepResult {
        position: from,
        node: current.id(),
        state: StepState::Stopped,
    })
}

/// Result for an end point on the node or within tolerance of it. Points
/// outside the node are pulled onto it.
fn reached(end: Vec3, node: &Node, tri: &[Vec3; 3]) -> StepResult {
    if point_in_convex_polygon_2d(&end, tri, 0.0) {
        return StepResult {
            position: end,
            node: node.id(),
            state: StepState::Reached,
        };
    }

    let [a, b, c] = *tri;
    StepResult {
        position: closest_point_on_triangle(&end, &a, &b, &c),
        node: node.id(),
        state: StepState::Sliding,
    }
}

/// Projects the movement left after `crossing` onto the wall `p0 -> p1`,
/// keeping the result on the wall segment.
fn slide_along_edge(crossing: Vec3, end: Vec3, p0: Vec3, p1: Vec3) -> Vec3 {
    if v_equal_2d(&p0, &p1) {
        return crossing;
    }

    let wall = Vec3::new(p1.x - p0.x, 0.0, p1.z - p0.z).normalize();
    let remaining = Vec3::new(end.x - crossing.x, 0.0, end.z - crossing.z);
    let target = crossing + wall * remaining.dot(wall);

    let (_, t) = dist_point_segment_sqr_2d(&target, &p0, &p1);
    p0.lerp(p1, t)
}
