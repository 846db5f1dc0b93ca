//! Zone query implementation
//!
//! This module contains the [`ZoneQuery`] structure, which runs spatial
//! lookups, path requests and step clamping against a single zone. A query
//! borrows its zone immutably and owns all of its search scratch state, so any
//! number of queries may run against the same zone from different threads.

use glam::Vec3;
use polypath_common::{
    closest_point_on_triangle, distance_squared, point_in_convex_polygon_2d,
    random_point_in_triangle, sqr, Error, Result,
};

use crate::astar::{self, Corridor};
use crate::config::QueryConfig;
use crate::funnel;
use crate::node_pool::NodePool;
use crate::path::{PartialReason, Path, PathStatus};
use crate::step_clamp::{self, StepResult};
use crate::zone::{Group, GroupId, Node, NodeId, Zone};

/// Restricts random sampling to nodes near a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Near {
    pub position: Vec3,
    /// Maximum centroid distance from `position`
    pub range: f32,
}

impl Near {
    pub fn new(position: Vec3, range: f32) -> Self {
        Self { position, range }
    }
}

/// What a random sample should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// The sampled node itself
    Node,
    /// The sampled node's centroid
    Centroid,
    /// A uniformly distributed point on the sampled node
    Surface,
}

/// Result of a random sample: either a node handle or a standalone point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RandomSample {
    Node(NodeId),
    Point(Vec3),
}

/// Query object bound to one zone
#[derive(Debug)]
pub struct ZoneQuery<'a> {
    zone: &'a Zone,
    config: QueryConfig,
    /// Scratch state for corridor searches
    node_pool: NodePool,
    rng: fastrand::Rng,
}

impl<'a> ZoneQuery<'a> {
    /// Creates a query with the default configuration
    pub fn new(zone: &'a Zone) -> Self {
        Self {
            zone,
            config: QueryConfig::default(),
            node_pool: NodePool::new(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a query with a custom configuration, rejecting invalid values
    pub fn with_config(zone: &'a Zone, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(zone)
        })
    }

    /// Seeds the generator used by random sampling
    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    pub fn zone(&self) -> &'a Zone {
        self.zone
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Whether `position` stands on `node`: inside its ground-plane projection
    /// and, if configured, within the vertical tolerance of its corners
    pub fn node_contains(&self, node: &Node, position: &Vec3) -> bool {
        let tri = self.zone.triangle(node);

        if let Some(tolerance) = self.config.height_tolerance {
            let lowest = tri.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
            let highest = tri.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);
            if position.y < lowest - tolerance || position.y > highest + tolerance {
                return false;
            }
        }

        point_in_convex_polygon_2d(position, &tri, self.config.containment_epsilon)
    }

    /// Finds the node of `group` closest to `position`.
    ///
    /// With `check_polygon` set, nodes standing under the position are
    /// preferred; otherwise (or when none contains it) the node with the
    /// nearest centroid wins. Ties go to the lowest node id.
    pub fn closest_node(&self, position: Vec3, group: GroupId, check_polygon: bool) -> Result<NodeId> {
        let group = self.zone.group(group)?;
        self.closest_node_in(group, &position, check_polygon)
            .map(Node::id)
            .ok_or_else(|| Error::NotFound(format!("no nodes in group {}", group.id())))
    }

    fn closest_node_in<'g>(&self, group: &'g Group, position: &Vec3, check_polygon: bool) -> Option<&'g Node> {
        if check_polygon {
            let containing = nearest_centroid(
                group.nodes().iter().filter(|node| self.node_contains(node, position)),
                position,
            );
            if containing.is_some() {
                return containing;
            }
        }

        nearest_centroid(group.nodes().iter(), position)
    }

    /// Finds the point of `group`'s surface nearest to `position`.
    ///
    /// Returns the node, the point, and whether the node contains the
    /// position itself (in which case the point is `position` unchanged).
    pub fn closest_point(&self, position: Vec3, group: GroupId) -> Result<(NodeId, Vec3, bool)> {
        let group = self.zone.group(group)?;
        self.locate(group, position)
    }

    fn locate(&self, group: &Group, position: Vec3) -> Result<(NodeId, Vec3, bool)> {
        let containing = nearest_centroid(
            group.nodes().iter().filter(|node| self.node_contains(node, &position)),
            &position,
        );
        if let Some(node) = containing {
            return Ok((node.id(), position, true));
        }

        let mut best: Option<(NodeId, Vec3, f32)> = None;
        for node in group.nodes() {
            let [a, b, c] = self.zone.triangle(node);
            let point = closest_point_on_triangle(&position, &a, &b, &c);
            let d = distance_squared(&point, &position);
            if best.map_or(true, |(_, _, best_d)| d < best_d) {
                best = Some((node.id(), point, d));
            }
        }

        best.map(|(node, point, _)| (node, point, false))
            .ok_or_else(|| Error::NotFound(format!("no nodes in group {}", group.id())))
    }

    /// Picks a node of `group` uniformly at random.
    ///
    /// With `near`, only nodes whose centroid lies within range are
    /// candidates; if none qualifies the whole group is sampled instead.
    pub fn random_node(&mut self, group: GroupId, near: Option<Near>) -> Result<NodeId> {
        let group = self.zone.group(group)?;

        let mut candidates: Vec<&Node> = match near {
            Some(near) => {
                if near.range.is_nan() || near.range < 0.0 {
                    return Err(Error::InvalidParam(format!(
                        "sampling range must be non-negative, got {}",
                        near.range
                    )));
                }
                let range_sqr = sqr(near.range);
                group
                    .nodes()
                    .iter()
                    .filter(|node| distance_squared(&node.centroid(), &near.position) <= range_sqr)
                    .collect()
            }
            None => Vec::new(),
        };
        if candidates.is_empty() {
            candidates = group.nodes().iter().collect();
        }
        if candidates.is_empty() {
            return Err(Error::NotFound(format!("no nodes in group {}", group.id())));
        }

        Ok(candidates[self.rng.usize(..candidates.len())].id())
    }

    /// Draws a random sample from `group`; see [`ZoneQuery::random_node`]
    pub fn random_sample(
        &mut self,
        group: GroupId,
        near: Option<Near>,
        kind: SampleKind,
    ) -> Result<RandomSample> {
        let id = self.random_node(group, near)?;
        let node = self.zone.node(group, id)?;

        Ok(match kind {
            SampleKind::Node => RandomSample::Node(id),
            SampleKind::Centroid => RandomSample::Point(node.centroid()),
            SampleKind::Surface => {
                let [a, b, c] = self.zone.triangle(node);
                RandomSample::Point(random_point_in_triangle(&a, &b, &c, self.rng.f32(), self.rng.f32()))
            }
        })
    }

    /// Determines which group `position` belongs to.
    ///
    /// With `check_polygon`, the first group (in order) with a node containing
    /// the position wins. Otherwise, or when no group contains it, the group
    /// with the nearest node centroid wins, provided that centroid lies within
    /// [`QueryConfig::max_group_distance`].
    pub fn group_of(&self, position: Vec3, check_polygon: bool) -> Result<GroupId> {
        if check_polygon {
            for group in self.zone.groups() {
                if group.nodes().iter().any(|node| self.node_contains(node, &position)) {
                    return Ok(group.id());
                }
            }
        }

        let mut best: Option<(GroupId, f32)> = None;
        for group in self.zone.groups() {
            if let Some(node) = nearest_centroid(group.nodes().iter(), &position) {
                let d = distance_squared(&node.centroid(), &position);
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((group.id(), d));
                }
            }
        }

        match best {
            Some((group, d)) if d <= sqr(self.config.max_group_distance) => Ok(group),
            _ => Err(Error::NotFound(format!(
                "no group contains or is near position {position}"
            ))),
        }
    }

    /// Finds the cheapest node corridor between two nodes of a group
    pub fn find_corridor(&mut self, group: GroupId, start: NodeId, target: NodeId) -> Result<Corridor> {
        let zone = self.zone;
        astar::find_corridor(
            zone.group(group)?,
            start,
            target,
            &mut self.node_pool,
            self.config.max_search_nodes,
        )
    }

    /// Finds a smoothed path from `start` to `end` within one group.
    ///
    /// Never fails for lack of a route: when the target cannot be reached the
    /// path ends at the reachable point closest to it and its status says why.
    /// Start and end points off the mesh are moved onto the nearest node.
    pub fn find_path(&mut self, start: Vec3, end: Vec3, group: GroupId) -> Result<Path> {
        let zone = self.zone;
        let group_ref = zone.group(group)?;

        let (start_node, start_pos, _) = self.locate(group_ref, start)?;
        let (target_node, target_pos, target_on_mesh) = self.locate(group_ref, end)?;

        let outcome = astar::search(
            group_ref,
            start_node,
            target_node,
            &mut self.node_pool,
            self.config.max_search_nodes,
        )?;

        let (end_pos, status) = if outcome.reached {
            let status = if target_on_mesh {
                PathStatus::Complete
            } else {
                PathStatus::Partial(PartialReason::TargetOffMesh)
            };
            (target_pos, status)
        } else {
            let last = outcome
                .corridor
                .last()
                .ok_or_else(|| Error::DegenerateInput("search produced an empty corridor".to_string()))?;
            let [a, b, c] = zone.triangle(group_ref.try_node(last)?);
            let reason = if outcome.budget_exhausted {
                PartialReason::SearchBudgetExhausted
            } else {
                PartialReason::Unreachable
            };
            log::debug!(
                "path in group {group} stops at node {last} short of node {target_node}: {reason:?}"
            );
            (closest_point_on_triangle(&end, &a, &b, &c), PathStatus::Partial(reason))
        };

        let waypoints = funnel::smooth(zone, group_ref, &outcome.corridor.nodes, start_pos, end_pos)?;

        Ok(Path {
            waypoints,
            corridor: outcome.corridor.nodes,
            group,
            status,
        })
    }

    /// Finds a path from `start` to `end`, resolving the group from `start`.
    ///
    /// If `end` belongs to a different group the path leads to the point of
    /// the start's group closest to `end`.
    pub fn find_path_in_zone(&mut self, start: Vec3, end: Vec3) -> Result<Path> {
        let start_group = self.group_of(start, true)?;
        let target_group = self.group_of(end, true).ok();

        let mut path = self.find_path(start, end, start_group)?;
        if let Some(target_group) = target_group {
            if target_group != start_group {
                log::debug!(
                    "target lies in group {target_group}, unreachable from group {start_group}"
                );
                path.status = PathStatus::Partial(PartialReason::Unreachable);
            }
        }

        Ok(path)
    }

    /// Clamps one movement step to the walkable surface of `group`
    pub fn clamp_step(&self, start: Vec3, end: Vec3, node: NodeId, group: GroupId) -> Result<StepResult> {
        let group = self.zone.group(group)?;
        step_clamp::clamp_step(
            self.zone,
            group,
            node,
            start,
            end,
            self.config.containment_epsilon,
        )
    }
}

/// Node with the centroid nearest `position`; the first node wins ties
fn nearest_centroid<'n>(nodes: impl Iterator<Item = &'n Node>, position: &Vec3) -> Option<&'n Node> {
    let mut best: Option<(&Node, f32)> = None;
    for node in nodes {
        let d = distance_squared(&node.centroid(), position);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((node, d));
        }
    }
    best.map(|(node, _)| node)
}
