//! Navigation on triangle meshes
//!
//! This crate turns triangle soups into navigation [`Zone`]s and answers
//! queries against them: which node or group a position belongs to, random
//! sampling, A* corridor search with funnel smoothing into a waypoint path, and
//! per-tick step clamping that keeps moving agents on the walkable surface.
//!
//! # Example
//!
//! ```rust
//! use polypath::{GroupId, Pathfinding, Vec3};
//!
//! # fn example() -> polypath::Result<()> {
//! let floor = [
//!     [Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0)],
//!     [Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 4.0)],
//! ];
//!
//! let pathfinding = Pathfinding::new();
//! pathfinding.create_zone("level1", &floor)?;
//!
//! let start = Vec3::new(0.5, 0.0, 3.5);
//! let end = Vec3::new(3.5, 0.0, 0.5);
//! let group = pathfinding.group_of("level1", start, true)?;
//! assert_eq!(group, GroupId::new(0));
//!
//! let path = pathfinding.find_path("level1", start, end, group)?;
//! assert!(path.is_complete());
//! assert_eq!(path.waypoints, vec![start, end]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// Allow unused code in tests - helpers are shared by many test modules
#![cfg_attr(test, allow(unused))]

mod astar;
mod config;
mod funnel;
mod node_pool;
mod path;
mod pathfinding;
mod step_clamp;
mod zone;
mod zone_builder;
mod zone_query;

#[cfg(test)]
mod test_mesh_helpers;

#[cfg(test)]
mod spatial_query_tests;

pub use astar::{find_corridor, Corridor};
pub use config::{QueryConfig, ZoneConfig};
pub use funnel::{portal_between, smooth, string_pull, Portal};
pub use node_pool::{NodeFlags, NodePool, NodeQueue, SearchNode};
pub use path::{PartialReason, Path, PathStatus};
pub use pathfinding::Pathfinding;
pub use step_clamp::{clamp_step, StepResult, StepState};
pub use zone::{Group, GroupId, Link, Node, NodeId, VertexId, Zone};
pub use zone_builder::{weld_vertices, WeldedVertices, ZoneBuilder};
pub use zone_query::{Near, RandomSample, SampleKind, ZoneQuery};

pub use polypath_common::{Error, Result, Vec3};
