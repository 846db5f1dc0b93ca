//! A* corridor search over a group's node graph
//!
//! Edge costs and the heuristic are both Euclidean distances between node
//! centroids, which keeps the heuristic consistent: a node never needs to be
//! reopened once closed.

use polypath_common::{distance, Error, Result};

use crate::node_pool::{NodeFlags, NodePool, NodeQueue};
use crate::zone::{Group, NodeId};

/// Ordered run of nodes from a start node to a target node
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    /// Nodes in travel order, start first
    pub nodes: Vec<NodeId>,
    /// Sum of centroid-to-centroid distances along the corridor
    pub cost: f32,
}

impl Corridor {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Last node of the corridor
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// Result of a search that may stop short of its target
#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome {
    /// Corridor to the target, or to the explored node closest to it
    pub corridor: Corridor,
    /// Whether the corridor ends at the target
    pub reached: bool,
    /// Whether the search stopped because it ran out of node budget
    pub budget_exhausted: bool,
}

/// Finds the cheapest corridor between two nodes of a group.
///
/// Fails with [`Error::NoPath`] when the target cannot be reached within
/// `max_nodes` expansions.
pub fn find_corridor(
    group: &Group,
    start: NodeId,
    target: NodeId,
    pool: &mut NodePool,
    max_nodes: usize,
) -> Result<Corridor> {
    let outcome = search(group, start, target, pool, max_nodes)?;
    if outcome.reached {
        Ok(outcome.corridor)
    } else {
        Err(Error::NoPath {
            start: start.id(),
            target: target.id(),
        })
    }
}

/// Runs A* from `start` toward `target`.
///
/// When the target is not reached the corridor leads to the closed node whose
/// centroid is nearest the target's centroid.
pub(crate) fn search(
    group: &Group,
    start: NodeId,
    target: NodeId,
    pool: &mut NodePool,
    max_nodes: usize,
) -> Result<SearchOutcome> {
    let start_node = group.try_node(start)?;
    let goal = group.try_node(target)?.centroid();

    if start == target {
        return Ok(SearchOutcome {
            corridor: Corridor {
                nodes: vec![start],
                cost: 0.0,
            },
            reached: true,
            budget_exhausted: false,
        });
    }

    pool.reset(group.len());
    let mut open = NodeQueue::new();

    let start_h = distance(&start_node.centroid(), &goal);
    if let Some(node) = pool.get_mut(start) {
        node.total = start_h;
        node.flags.insert(NodeFlags::OPEN);
    }
    open.push(start, start_h);

    let mut best = start;
    let mut best_h = start_h;
    let mut expanded = 0;
    let mut reached = false;
    let mut budget_exhausted = false;

    while let Some((current, _)) = open.pop() {
        let Some(state) = pool.get_mut(current) else {
            continue;
        };
        // Stale duplicate of a node that was already expanded
        if state.flags.contains(NodeFlags::CLOSED) {
            continue;
        }
        state.flags.remove(NodeFlags::OPEN);
        state.flags.insert(NodeFlags::CLOSED);
        let current_cost = state.cost;

        if current == target {
            best = target;
            reached = true;
            break;
        }

        let node = group.try_node(current)?;
        let h = distance(&node.centroid(), &goal);
        if h < best_h {
            best_h = h;
            best = current;
        }

        if expanded >= max_nodes {
            budget_exhausted = true;
            break;
        }
        expanded += 1;

        for link in node.links() {
            let Some(neighbour) = group.node(link.neighbour) else {
                continue;
            };
            let Some(state) = pool.get_mut(link.neighbour) else {
                continue;
            };
            if state.flags.contains(NodeFlags::CLOSED) {
                continue;
            }

            let cost = current_cost + distance(&node.centroid(), &neighbour.centroid());
            if state.flags.contains(NodeFlags::OPEN) && cost >= state.cost {
                continue;
            }

            let total = cost + distance(&neighbour.centroid(), &goal);
            state.cost = cost;
            state.total = total;
            state.parent = Some(current);
            state.flags.insert(NodeFlags::OPEN);
            open.push(link.neighbour, total);
        }
    }

    // Walk parent links back to the start
    let mut nodes = vec![best];
    let mut current = best;
    while let Some(parent) = pool.get(current).and_then(|state| state.parent) {
        nodes.push(parent);
        current = parent;
    }
    nodes.reverse();

    let cost = pool.get(best).map_or(0.0, |state| state.cost);

    Ok(SearchOutcome {
        corridor: Corridor { nodes, cost },
        reached,
        budget_exhausted,
    })
}
