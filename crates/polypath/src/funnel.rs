//! Corridor smoothing with the funnel (string-pulling) algorithm

use glam::Vec3;
use polypath_common::{left, left_on, right, right_on, tri_area_2d, v_equal_2d, Error, Result};

use crate::zone::{Group, NodeId, Zone};

/// A portal oriented relative to the direction of travel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub left: Vec3,
    pub right: Vec3,
}

impl Portal {
    /// A zero-width portal, used for the corridor's start and end points
    pub fn point(p: Vec3) -> Self {
        Self { left: p, right: p }
    }
}

/// Gets the portal between two adjacent nodes, oriented for travel from `from` to `to`
pub fn portal_between(zone: &Zone, group: &Group, from: NodeId, to: NodeId) -> Result<Portal> {
    let from_node = group.try_node(from)?;
    let portal = from_node.portal_to(to).ok_or_else(|| {
        Error::InvalidParam(format!("nodes {from} and {to} are not adjacent"))
    })?;

    let [a, b] = zone.portal_points(portal);
    let origin = from_node.centroid();
    if tri_area_2d(&origin, &a, &b) > 0.0 {
        Ok(Portal { left: b, right: a })
    } else {
        Ok(Portal { left: a, right: b })
    }
}

/// Pulls a string through a sequence of portals.
///
/// The first and last portals are expected to be the path's start and end
/// points. Returns the shortest polyline through every portal.
pub fn string_pull(portals: &[Portal]) -> Vec<Vec3> {
    let Some(first) = portals.first() else {
        return Vec::new();
    };

    let mut path = vec![first.left];
    let mut apex = first.left;
    let mut funnel_left = first.left;
    let mut funnel_right = first.right;
    let mut apex_index = 0;
    let mut left_index = 0;
    let mut right_index = 0;

    let mut i = 1;
    while i < portals.len() {
        let portal = &portals[i];

        // Right side
        if left_on(&apex, &funnel_right, &portal.right) {
            if v_equal_2d(&apex, &funnel_right) || right(&apex, &funnel_left, &portal.right) {
                // Tighten the funnel
                funnel_right = portal.right;
                right_index = i;
            } else {
                // Right crossed over left: the left point becomes a corner
                push_point(&mut path, funnel_left);
                apex = funnel_left;
                apex_index = left_index;
                funnel_left = apex;
                funnel_right = apex;
                left_index = apex_index;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        // Left side
        if right_on(&apex, &funnel_left, &portal.left) {
            if v_equal_2d(&apex, &funnel_left) || left(&apex, &funnel_right, &portal.left) {
                // Tighten the funnel
                funnel_left = portal.left;
                left_index = i;
            } else {
                // Left crossed over right: the right point becomes a corner
                push_point(&mut path, funnel_right);
                apex = funnel_right;
                apex_index = right_index;
                funnel_left = apex;
                funnel_right = apex;
                left_index = apex_index;
                right_index = apex_index;
                i = apex_index + 1;
                continue;
            }
        }

        i += 1;
    }

    if let Some(last) = portals.last() {
        push_point(&mut path, last.left);
    }

    path
}

fn push_point(path: &mut Vec<Vec3>, p: Vec3) {
    if path.last().map_or(true, |last| !v_equal_2d(last, &p)) {
        path.push(p);
    }
}

/// Converts a node corridor into the shortest polyline from `start` to `end`
/// that stays inside the corridor's nodes.
pub fn smooth(
    zone: &Zone,
    group: &Group,
    corridor: &[NodeId],
    start: Vec3,
    end: Vec3,
) -> Result<Vec<Vec3>> {
    if corridor.is_empty() {
        return Err(Error::DegenerateInput("empty corridor".to_string()));
    }

    if corridor.len() == 1 {
        return Ok(vec![start, end]);
    }

    let mut portals = Vec::with_capacity(corridor.len() + 1);
    portals.push(Portal::point(start));
    for pair in corridor.windows(2) {
        portals.push(portal_between(zone, group, pair[0], pair[1])?);
    }
    portals.push(Portal::point(end));

    let mut path = string_pull(&portals);
    // Coincident start and end collapse to one point
    if path.len() == 1 {
        path.push(end);
    }

    Ok(path)
}
