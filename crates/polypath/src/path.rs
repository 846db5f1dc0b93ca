//! Path results returned by path requests

use glam::Vec3;

use crate::zone::{GroupId, NodeId};

/// Why a path stops short of the requested target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialReason {
    /// The target lies in a part of the mesh not connected to the start
    Unreachable,
    /// The search ran out of node budget before reaching the target
    SearchBudgetExhausted,
    /// The target lies off the mesh; the path ends at the nearest point on it
    TargetOffMesh,
}

/// Completion status of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// The path ends at the requested target
    Complete,
    /// The path ends at the reachable point closest to the target
    Partial(PartialReason),
}

/// A smoothed path over one group of a zone
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Polyline from the start point to the end point
    pub waypoints: Vec<Vec3>,
    /// Node corridor the polyline was pulled through
    pub corridor: Vec<NodeId>,
    /// Group the path runs in
    pub group: GroupId,
    pub status: PathStatus,
}

impl Path {
    pub fn is_complete(&self) -> bool {
        self.status == PathStatus::Complete
    }

    /// Final point of the path
    pub fn end(&self) -> Option<Vec3> {
        self.waypoints.last().copied()
    }

    /// Total length of the polyline
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}
