//! Zone construction from triangle soups
//!
//! Building runs in four passes:
//!
//! 1. Weld input vertices that lie within the tolerance of each other
//! 2. Create one node per surviving triangle, normalising its winding
//! 3. Link nodes that share an edge, recording the shared edge as the portal
//! 4. Split the node graph into connected groups and renumber nodes per group

use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec3;
use polypath_common::{centroid, distance_squared, tri_area_2d, triangle_area, Error, Result};

use crate::config::ZoneConfig;
use crate::zone::{Group, GroupId, Link, Node, NodeId, VertexId, Zone};

/// Vertex list produced by [`weld_vertices`]
#[derive(Debug, Clone, PartialEq)]
pub struct WeldedVertices {
    /// One position per welded vertex
    pub vertices: Vec<Vec3>,
    /// For every input point, the welded vertex it collapsed into
    pub remap: Vec<VertexId>,
}

/// Disjoint sets over input indices; the root of a set is always its smallest member
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Merges points that lie within `tolerance` of each other.
///
/// Merging is transitive: a chain of near-duplicates collapses into a single
/// vertex even when its ends are farther apart than the tolerance. Each welded
/// vertex takes the position of the earliest input point in its cluster and ids
/// are assigned in order of first appearance.
pub fn weld_vertices(points: &[Vec3], tolerance: f32) -> WeldedVertices {
    let cell_size = if tolerance > 0.0 { tolerance } else { 1.0 };
    let tolerance_sqr = tolerance * tolerance;
    let cell_of = |p: &Vec3| {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
            (p.z / cell_size).floor() as i64,
        )
    };

    let mut sets = DisjointSet::new(points.len());
    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();

    for (i, p) in points.iter().enumerate() {
        let (cx, cy, cz) = cell_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &j in bucket {
                        if distance_squared(p, &points[j]) <= tolerance_sqr {
                            sets.union(i, j);
                        }
                    }
                }
            }
        }
        grid.entry((cx, cy, cz)).or_default().push(i);
    }

    let mut vertices = Vec::new();
    let mut root_ids = vec![VertexId::new(0); points.len()];
    let mut remap = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let root = sets.find(i);
        if root == i {
            root_ids[i] = VertexId::new(vertices.len() as u32);
            vertices.push(*p);
        }
        remap.push(root_ids[root]);
    }

    WeldedVertices { vertices, remap }
}

/// Builds [`Zone`]s according to a [`ZoneConfig`]
#[derive(Debug, Clone, Default)]
pub struct ZoneBuilder {
    config: ZoneConfig,
}

impl ZoneBuilder {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Builds a zone from a triangle soup
    pub fn build(&self, triangles: &[[Vec3; 3]]) -> Result<Zone> {
        self.config.validate()?;

        for (i, tri) in triangles.iter().enumerate() {
            if tri.iter().any(|p| !p.is_finite()) {
                return Err(Error::InvalidMesh(format!(
                    "triangle {i} has a non-finite coordinate"
                )));
            }
        }

        let points: Vec<Vec3> = triangles.iter().flatten().copied().collect();
        let welded = weld_vertices(&points, self.config.weld_tolerance);
        let tris: Vec<[VertexId; 3]> = welded
            .remap
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        self.assemble(welded.vertices, &tris)
    }

    /// Builds a zone from an indexed triangle list
    pub fn build_indexed(&self, vertices: &[Vec3], indices: &[u32]) -> Result<Zone> {
        self.config.validate()?;

        if indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(i) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(Error::InvalidMesh(format!(
                "vertex {i} has a non-finite coordinate"
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::InvalidMesh(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let welded = weld_vertices(vertices, self.config.weld_tolerance);
        let tris: Vec<[VertexId; 3]> = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]].map(|i| welded.remap[i as usize]))
            .collect();

        self.assemble(welded.vertices, &tris)
    }

    fn assemble(&self, vertices: Vec<Vec3>, input: &[[VertexId; 3]]) -> Result<Zone> {
        let pos = |id: VertexId| vertices[id.index()];

        // Pass 2: one triangle per surviving input face
        let mut tris: Vec<[VertexId; 3]> = Vec::with_capacity(input.len());
        let mut seen: HashSet<[VertexId; 3]> = HashSet::new();
        let mut dropped = 0;

        for (i, &tri) in input.iter().enumerate() {
            let [a, b, c] = tri;
            if a == b || b == c || a == c {
                log::warn!("dropping triangle {i}: vertices collapsed by welding");
                dropped += 1;
                continue;
            }

            let area = triangle_area(&pos(a), &pos(b), &pos(c));
            if area <= self.config.min_triangle_area {
                log::warn!("dropping triangle {i}: area {area} is degenerate");
                dropped += 1;
                continue;
            }

            let mut key = tri;
            key.sort();
            if !seen.insert(key) {
                log::warn!("dropping triangle {i}: duplicates an earlier triangle");
                dropped += 1;
                continue;
            }

            if tri_area_2d(&pos(a), &pos(b), &pos(c)) < 0.0 {
                tris.push([a, c, b]);
            } else {
                tris.push(tri);
            }
        }

        // Pass 3: adjacency through shared edges
        let edge_key = |a: VertexId, b: VertexId| if a < b { (a, b) } else { (b, a) };
        let mut edges: HashMap<(VertexId, VertexId), Vec<usize>> = HashMap::new();
        for (i, tri) in tris.iter().enumerate() {
            for k in 0..3 {
                edges
                    .entry(edge_key(tri[k], tri[(k + 1) % 3]))
                    .or_default()
                    .push(i);
            }
        }

        let mut adjacency: Vec<Vec<(usize, [VertexId; 2])>> = vec![Vec::new(); tris.len()];
        for (i, tri) in tris.iter().enumerate() {
            for k in 0..3 {
                let portal = [tri[k], tri[(k + 1) % 3]];
                for &j in &edges[&edge_key(portal[0], portal[1])] {
                    if j != i {
                        adjacency[i].push((j, portal));
                    }
                }
            }
        }

        // Pass 4: connected components, nodes renumbered in input order
        let mut component = vec![usize::MAX; tris.len()];
        let mut members: Vec<Vec<usize>> = Vec::new();
        for seed in 0..tris.len() {
            if component[seed] != usize::MAX {
                continue;
            }

            let group_index = members.len();
            let mut found = vec![seed];
            let mut queue = VecDeque::from([seed]);
            component[seed] = group_index;

            while let Some(current) = queue.pop_front() {
                for &(next, _) in &adjacency[current] {
                    if component[next] == usize::MAX {
                        component[next] = group_index;
                        found.push(next);
                        queue.push_back(next);
                    }
                }
            }

            found.sort_unstable();
            members.push(found);
        }

        let mut local_id = vec![NodeId::new(0); tris.len()];
        for found in &members {
            for (n, &tri_index) in found.iter().enumerate() {
                local_id[tri_index] = NodeId::new(n as u32);
            }
        }

        let groups: Vec<Group> = members
            .iter()
            .enumerate()
            .map(|(g, found)| Group {
                id: GroupId::new(g as u32),
                nodes: found
                    .iter()
                    .map(|&tri_index| {
                        let vertex_ids = tris[tri_index];
                        Node {
                            id: local_id[tri_index],
                            vertex_ids,
                            centroid: centroid(&vertex_ids.map(pos)),
                            links: adjacency[tri_index]
                                .iter()
                                .map(|&(next, portal)| Link {
                                    neighbour: local_id[next],
                                    portal,
                                })
                                .collect(),
                        }
                    })
                    .collect(),
            })
            .collect();

        log::debug!(
            "built zone: {} input triangles, {} vertices, {} nodes, {} groups, {} dropped",
            input.len(),
            vertices.len(),
            tris.len(),
            groups.len(),
            dropped
        );

        Ok(Zone {
            vertices,
            groups,
            dropped_triangles: dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_exact_duplicates() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::ZERO, Vec3::Z, Vec3::X];
        let welded = weld_vertices(&points, 0.0);
        assert_eq!(welded.vertices, vec![Vec3::ZERO, Vec3::X, Vec3::Z]);
        let ids: Vec<u32> = welded.remap.iter().map(VertexId::id).collect();
        assert_eq!(ids, vec![0, 1, 0, 2, 1]);
    }

    #[test]
    fn test_weld_earliest_vertex_wins() {
        let points = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.05, 0.0, 0.0)];
        let welded = weld_vertices(&points, 0.1);
        assert_eq!(welded.vertices, vec![Vec3::new(1.0, 0.0, 0.0)]);
        assert_eq!(welded.remap, vec![VertexId::new(0), VertexId::new(0)]);
    }

    #[test]
    fn test_weld_chains_merge_transitively() {
        // Each neighbour is within tolerance, the ends are not
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.08, 0.0, 0.0),
            Vec3::new(0.16, 0.0, 0.0),
            Vec3::new(0.24, 0.0, 0.0),
        ];
        let welded = weld_vertices(&points, 0.1);
        assert_eq!(welded.vertices.len(), 2);
        let ids: Vec<u32> = welded.remap.iter().map(VertexId::id).collect();
        assert_eq!(ids, vec![0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_weld_chain_joined_late() {
        // The middle point arrives last and bridges two existing clusters
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.18, 0.0, 0.0),
            Vec3::new(0.09, 0.0, 0.0),
        ];
        let welded = weld_vertices(&points, 0.1);
        assert_eq!(welded.vertices, vec![Vec3::ZERO]);
        assert!(welded.remap.iter().all(|id| id.id() == 0));
    }

    #[test]
    fn test_disjoint_set_keeps_smallest_root() {
        let mut sets = DisjointSet::new(5);
        sets.union(4, 3);
        sets.union(3, 1);
        sets.union(2, 4);
        assert_eq!(sets.find(4), 1);
        assert_eq!(sets.find(2), 1);
        assert_eq!(sets.find(0), 0);
    }
}
