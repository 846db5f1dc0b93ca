//! Navigation zone data model
//!
//! A [`Zone`] owns the welded vertex list and the connected [`Group`]s of
//! triangle [`Node`]s built from one triangle soup. Zones are immutable once
//! built: neighbour relations are stored as dense indices, never as references,
//! so a zone can be shared freely between threads.

use std::fmt;

use glam::Vec3;
use polypath_common::{Error, Result};

use crate::config::ZoneConfig;
use crate::zone_builder::ZoneBuilder;

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serialization",
            derive(serde::Serialize, serde::Deserialize)
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an id from its raw value
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Returns the raw id value
            pub const fn id(&self) -> u32 {
                self.0
            }

            /// Returns the id as an index into its owning list
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(
    /// Identity of a welded vertex, unique within a zone
    VertexId
);
dense_id!(
    /// Identity of a node, unique within its group
    NodeId
);
dense_id!(
    /// Index of a group in its zone's group list
    GroupId
);

/// Adjacency entry of a node: the neighbour and the shared edge leading to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Link {
    /// Neighbouring node in the same group
    pub neighbour: NodeId,
    /// The two vertices of the shared edge, in this node's winding order
    pub portal: [VertexId; 2],
}

impl Link {
    /// Whether this link crosses the edge formed by `a` and `b` (either order)
    pub fn crosses(&self, a: VertexId, b: VertexId) -> bool {
        (self.portal[0] == a && self.portal[1] == b) || (self.portal[0] == b && self.portal[1] == a)
    }
}

/// One walkable triangle of the navigation mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) vertex_ids: [VertexId; 3],
    pub(crate) centroid: Vec3,
    pub(crate) links: Vec<Link>,
}

impl Node {
    /// Id of the node within its group
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Boundary vertices, counter-clockwise on the ground plane
    pub fn vertex_ids(&self) -> &[VertexId; 3] {
        &self.vertex_ids
    }

    /// Arithmetic mean of the node's vertices
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Adjacency entries, one per shared edge
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Ids of all neighbouring nodes
    pub fn neighbours(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().map(|link| link.neighbour)
    }

    /// Shared edge leading to `neighbour`, if the two nodes are adjacent
    pub fn portal_to(&self, neighbour: NodeId) -> Option<[VertexId; 2]> {
        self.links
            .iter()
            .find(|link| link.neighbour == neighbour)
            .map(|link| link.portal)
    }

    /// Edge `i` of the node, running from vertex `i` to vertex `i + 1`
    pub fn edge(&self, i: usize) -> [VertexId; 2] {
        [self.vertex_ids[i % 3], self.vertex_ids[(i + 1) % 3]]
    }
}

/// A maximal set of nodes connected through shared edges
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Group {
    pub(crate) id: GroupId,
    pub(crate) nodes: Vec<Node>,
}

impl Group {
    /// Index of the group within its zone
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// All nodes, indexed by [`NodeId`]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks up a node by id, failing with [`Error::NotFound`]
    pub fn try_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id)
            .ok_or_else(|| Error::NotFound(format!("node {} in group {}", id, self.id)))
    }

    /// Number of nodes in the group
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the group has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The complete navigation representation of one mesh
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Zone {
    pub(crate) vertices: Vec<Vec3>,
    pub(crate) groups: Vec<Group>,
    pub(crate) dropped_triangles: usize,
}

impl Zone {
    /// Builds a zone from a triangle soup, welding vertices closer than `tolerance`
    pub fn build(triangles: &[[Vec3; 3]], tolerance: f32) -> Result<Self> {
        ZoneBuilder::new(ZoneConfig::default().with_weld_tolerance(tolerance)).build(triangles)
    }

    /// Builds a zone from an indexed triangle list
    pub fn from_indexed(vertices: &[Vec3], indices: &[u32], config: &ZoneConfig) -> Result<Self> {
        ZoneBuilder::new(config.clone()).build_indexed(vertices, indices)
    }

    /// Welded vertex positions, indexed by [`VertexId`]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Position of a vertex
    pub fn vertex(&self, id: VertexId) -> Option<Vec3> {
        self.vertices.get(id.index()).copied()
    }

    /// Groups in build order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Looks up a group, failing with [`Error::NotFound`]
    pub fn group(&self, id: GroupId) -> Result<&Group> {
        self.groups
            .get(id.index())
            .ok_or_else(|| Error::NotFound(format!("group {id}")))
    }

    /// Looks up a node of a group, failing with [`Error::NotFound`]
    pub fn node(&self, group: GroupId, node: NodeId) -> Result<&Node> {
        self.group(group)?.try_node(node)
    }

    /// Corner positions of a node, counter-clockwise on the ground plane
    pub fn triangle(&self, node: &Node) -> [Vec3; 3] {
        node.vertex_ids.map(|id| self.vertices[id.index()])
    }

    /// Positions of the two endpoints of a portal
    pub fn portal_points(&self, portal: [VertexId; 2]) -> [Vec3; 2] {
        portal.map(|id| self.vertices[id.index()])
    }

    /// Total number of nodes across all groups
    pub fn node_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Number of welded vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of input triangles discarded as degenerate during the build
    pub fn dropped_triangles(&self) -> usize {
        self.dropped_triangles
    }

    /// Whether the zone contains no walkable nodes
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
